//! Fully wired stack for integration tests.

use crate::fixtures::{customer_config, work_order_config, Customer, WorkOrder};
use outpost_core::{Connectivity, EntityRepository, MutationQueue};
use outpost_store::{LocalStore, MemoryStore};
use outpost_sync::{MonitorConfig, NetworkMonitor, NetworkStatus, SyncConfig, SyncCoordinator};
use outpost_transport::{Method, MockProbe, MockTransport, Transport, TransportError};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Everything wired together the way an application would do it at
/// startup: one store, one transport, one monitor, one queue, one
/// coordinator, and a repository per fixture collection.
///
/// The harness starts in the monitor's pre-first-check state (offline);
/// drive it with [`Harness::go_online`] / [`Harness::go_offline`].
pub struct Harness {
    /// Shared in-memory store.
    pub store: Arc<MemoryStore>,
    /// Scripted transport.
    pub transport: Arc<MockTransport>,
    /// Scripted internet probe.
    pub probe: Arc<MockProbe>,
    /// Shared mutation queue.
    pub queue: Arc<MutationQueue>,
    /// Network monitor wired to the transport and probe.
    pub monitor: Arc<NetworkMonitor>,
    /// Sync coordinator over both fixture collections.
    pub coordinator: Arc<SyncCoordinator>,
    /// Repository for [`WorkOrder`].
    pub work_orders: EntityRepository<WorkOrder>,
    /// Repository for [`Customer`].
    pub customers: EntityRepository<Customer>,
}

impl Harness {
    /// Builds the wired stack with test-friendly (short) timeouts.
    pub async fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(MockTransport::new());
        let probe = Arc::new(MockProbe::reachable());

        let dyn_store: Arc<dyn LocalStore> = store.clone();
        let dyn_transport: Arc<dyn Transport> = transport.clone();

        let queue = Arc::new(
            MutationQueue::open(dyn_store.clone())
                .await
                .expect("fresh memory store"),
        );

        let monitor = Arc::new(NetworkMonitor::new(
            MonitorConfig::new()
                .with_internet_timeout(Duration::from_millis(100))
                .with_health_timeout(Duration::from_millis(100))
                .with_change_retry_delay(Duration::from_millis(1)),
            dyn_transport.clone(),
            probe.clone(),
        ));

        let coordinator = Arc::new(SyncCoordinator::new(
            SyncConfig::new().with_change_retry_delay(Duration::from_millis(1)),
            vec![work_order_config(), customer_config()],
            dyn_store.clone(),
            queue.clone(),
            dyn_transport.clone(),
        ));

        let connectivity: Arc<dyn Connectivity> = monitor.clone();
        let work_orders = EntityRepository::new(
            work_order_config().with_retry_delay(Duration::from_millis(1)),
            dyn_store.clone(),
            queue.clone(),
            connectivity.clone(),
            dyn_transport.clone(),
        );
        let customers = EntityRepository::new(
            customer_config().with_retry_delay(Duration::from_millis(1)),
            dyn_store,
            queue.clone(),
            connectivity,
            dyn_transport,
        );

        Self {
            store,
            transport,
            probe,
            queue,
            monitor,
            coordinator,
            work_orders,
            customers,
        }
    }

    /// Scripts one healthy answer on the backend health endpoint.
    pub fn script_healthy_check(&self) {
        self.transport
            .enqueue_ok(Method::Get, "/health", json!({"status": "ok"}));
    }

    /// Restores connectivity and runs a probe cycle: the probe answers,
    /// the outage is lifted, and one health check is scripted.
    pub async fn go_online(&self) -> NetworkStatus {
        self.probe.set_default(Ok(204));
        self.transport.clear_outage();
        self.script_healthy_check();
        self.monitor.device_changed(true).await
    }

    /// Drops connectivity at every tier and runs a probe cycle.
    pub async fn go_offline(&self) -> NetworkStatus {
        self.probe
            .set_default(Err(TransportError::connection("interface down")));
        self.transport
            .set_outage(TransportError::connection("interface down"));
        self.monitor.device_changed(false).await
    }

    /// Lets spawned background work (cache refreshes, reconnect sync
    /// passes) run to completion.
    pub async fn settle(&self) {
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
