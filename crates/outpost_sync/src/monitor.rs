//! Three-tier network monitor.

use crate::config::MonitorConfig;
use crate::subscription::{ListenerSet, Subscription};
use outpost_core::entity::stamp;
use outpost_core::Connectivity;
use outpost_transport::{ReachabilityProbe, Transport, TransportError, TransportErrorKind};
use parking_lot::Mutex as SyncMutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Snapshot of the monitor's connectivity verdict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkStatus {
    /// Combined verdict: device, internet, and backend all reachable.
    pub online: bool,
    /// True while a probe cycle is running.
    pub checking: bool,
    /// Epoch-millisecond of the last completed probe cycle.
    pub last_checked_ms: Option<i64>,
    /// Tier 2: the wider internet answered the probe.
    pub internet_connected: bool,
    /// Tier 3: the backend health endpoint answered.
    pub backend_healthy: bool,
}

impl NetworkStatus {
    fn unknown() -> Self {
        Self {
            online: false,
            checking: false,
            last_checked_ms: None,
            internet_connected: false,
            backend_healthy: false,
        }
    }

    /// The tuple whose transitions drive listener notifications.
    fn tuple(&self) -> (bool, bool, bool) {
        (self.online, self.internet_connected, self.backend_healthy)
    }
}

enum HealthOutcome {
    Healthy,
    NetworkChanged,
    Unhealthy,
}

/// One authoritative, debounced answer to "can we reach the backend".
///
/// Connectivity is decided in three tiers, checked in strict order and
/// short-circuiting on failure:
///
/// 1. **Device** - an event-driven interface flag ([`NetworkMonitor::device_changed`]).
///    When it is down, tiers 2-3 are skipped entirely.
/// 2. **Internet** - a short probe to a well-known endpoint. A
///    network-change error here is a handoff false positive and counts as
///    reachable.
/// 3. **Backend** - a health-endpoint GET. Both success and an
///    authorization rejection count as healthy (the server is up even if
///    the caller lacks a session); a network-change error gets exactly one
///    retry.
///
/// Probes run only on device events and explicit [`NetworkMonitor::force_check`]
/// calls - never on a timer - and never overlap: concurrent triggers queue
/// behind the in-flight cycle. Listeners are notified once per actual
/// transition of `(online, internet_connected, backend_healthy)` and never
/// for a re-check that lands on the same tuple.
///
/// A fresh monitor reports offline until its first probe cycle; callers
/// normally issue one `force_check` at startup.
pub struct NetworkMonitor {
    config: MonitorConfig,
    transport: Arc<dyn Transport>,
    probe: Arc<dyn ReachabilityProbe>,
    device_online: AtomicBool,
    status: SyncMutex<NetworkStatus>,
    listeners: ListenerSet<NetworkStatus>,
    /// Serializes probe cycles; concurrent triggers queue behind it.
    probe_gate: AsyncMutex<()>,
}

impl NetworkMonitor {
    /// Creates a monitor. The device tier starts online; everything else
    /// is unknown (offline) until the first probe cycle.
    pub fn new(
        config: MonitorConfig,
        transport: Arc<dyn Transport>,
        probe: Arc<dyn ReachabilityProbe>,
    ) -> Self {
        Self {
            config,
            transport,
            probe,
            device_online: AtomicBool::new(true),
            status: SyncMutex::new(NetworkStatus::unknown()),
            listeners: ListenerSet::new(),
            probe_gate: AsyncMutex::new(()),
        }
    }

    /// Returns the current status snapshot.
    #[must_use]
    pub fn status(&self) -> NetworkStatus {
        self.status.lock().clone()
    }

    /// Returns the current combined verdict.
    #[must_use]
    pub fn is_online(&self) -> bool {
        self.status.lock().online
    }

    /// Registers a status listener.
    ///
    /// The callback fires immediately with the current status, then once
    /// per actual transition. The returned [`Subscription`] unsubscribes
    /// on drop.
    pub fn on_status_change(
        &self,
        callback: impl Fn(&NetworkStatus) + Send + Sync + 'static,
    ) -> Subscription {
        callback(&self.status());
        self.listeners.subscribe(callback)
    }

    /// Feeds a device-level connectivity event and runs a probe cycle.
    ///
    /// This is the integration point for platform online/offline signals.
    pub async fn device_changed(&self, online: bool) -> NetworkStatus {
        self.device_online.store(online, Ordering::SeqCst);
        tracing::debug!(online, "device connectivity event");
        self.force_check().await
    }

    /// Runs a full probe cycle and returns the resulting status.
    ///
    /// If a cycle is already in flight, this waits for its turn rather
    /// than running a second probe concurrently.
    pub async fn force_check(&self) -> NetworkStatus {
        let _gate = self.probe_gate.lock().await;

        self.status.lock().checking = true;
        let (internet_connected, backend_healthy) = self.run_probes().await;
        let device_online = self.device_online.load(Ordering::SeqCst);

        let (result, transition) = {
            let mut status = self.status.lock();
            let before = status.tuple();
            status.checking = false;
            status.internet_connected = internet_connected;
            status.backend_healthy = backend_healthy;
            status.online = device_online && internet_connected && backend_healthy;
            status.last_checked_ms = Some(stamp::now_millis());
            let transition = (status.tuple() != before).then(|| status.clone());
            (status.clone(), transition)
        };

        if let Some(status) = transition {
            tracing::info!(
                online = status.online,
                internet = status.internet_connected,
                backend = status.backend_healthy,
                "network status changed"
            );
            self.listeners.emit(&status);
        }
        result
    }

    async fn run_probes(&self) -> (bool, bool) {
        // tier 1: no interface, no point probing anything
        if !self.device_online.load(Ordering::SeqCst) {
            return (false, false);
        }

        // tier 2
        if !self.check_internet().await {
            return (false, false);
        }

        // tier 3
        (true, self.check_backend().await)
    }

    async fn check_internet(&self) -> bool {
        let probe = self.probe.check(&self.config.probe_url);
        match tokio::time::timeout(self.config.internet_timeout, probe).await {
            Ok(Ok(_)) => true,
            // interface handoff mid-probe; the route is changing, not gone
            Ok(Err(err)) if err.kind() == TransportErrorKind::NetworkChanged => true,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "internet probe failed");
                false
            }
            Err(_) => {
                tracing::debug!("internet probe timed out");
                false
            }
        }
    }

    async fn check_backend(&self) -> bool {
        match self.health_request().await {
            HealthOutcome::Healthy => true,
            HealthOutcome::Unhealthy => false,
            HealthOutcome::NetworkChanged => {
                tokio::time::sleep(self.config.change_retry_delay).await;
                matches!(self.health_request().await, HealthOutcome::Healthy)
            }
        }
    }

    async fn health_request(&self) -> HealthOutcome {
        let request = self.transport.get(&self.config.health_path);
        match tokio::time::timeout(self.config.health_timeout, request).await {
            Ok(Ok(_)) => HealthOutcome::Healthy,
            // the server is up even if the caller lacks a session
            Ok(Err(TransportError::Unauthorized)) => HealthOutcome::Healthy,
            Ok(Err(TransportError::NetworkChanged)) => HealthOutcome::NetworkChanged,
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "backend health check failed");
                HealthOutcome::Unhealthy
            }
            Err(_) => {
                tracing::debug!("backend health check timed out");
                HealthOutcome::Unhealthy
            }
        }
    }
}

impl Connectivity for NetworkMonitor {
    fn is_online(&self) -> bool {
        NetworkMonitor::is_online(self)
    }
}
