//! Sync coordinator: replays the mutation queue once connectivity returns.

use crate::config::SyncConfig;
use crate::monitor::NetworkMonitor;
use crate::subscription::{ListenerSet, Subscription};
use outpost_core::entity::{creation_body, update_body};
use outpost_core::{Mutation, MutationKind, MutationQueue, RecordId, RepositoryConfig};
use outpost_store::LocalStore;
use outpost_transport::{ApiResponse, Method, Transport, TransportError};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

/// Aggregate outcome of one sync pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Mutations confirmed by the server and removed from the queue.
    pub success: usize,
    /// Mutations that failed this pass (retrying or permanently dropped).
    pub failed: usize,
    /// Human-readable failure descriptions, in replay order.
    pub errors: Vec<String>,
}

impl SyncReport {
    fn merge(&mut self, other: SyncReport) {
        self.success += other.success;
        self.failed += other.failed;
        self.errors.extend(other.errors);
    }

    /// True if every replayed mutation was confirmed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.errors.is_empty()
    }
}

/// Outcome of replaying one mutation.
enum Outcome {
    /// Confirmed and removed; for creates, carries the id rewrite.
    Confirmed { rekey: Option<(String, RecordId)> },
    /// Session rejected; the whole pass aborts.
    Unauthorized,
    /// Recoverable failure; retry accounting decides its fate.
    Failed(String),
    /// Unsendable forever (temporary id with no queued create); dropped.
    Orphaned,
}

/// Replays the durable mutation queue against the backend.
///
/// Mutations for one collection replay strictly FIFO; different
/// collections replay concurrently, which is safe because entities are
/// independent aggregates. A mutation that fails recoverably blocks later
/// mutations for the *same record* until the next pass, so a later update
/// can never overtake the create or update it depends on.
///
/// Passes are serialized by an async gate, and queue removal is
/// idempotent, so `force_sync_now` is safe to call at any moment - a
/// second concurrent call just finds an empty or already-drained queue.
pub struct SyncCoordinator {
    config: SyncConfig,
    collections: HashMap<String, RepositoryConfig>,
    store: Arc<dyn LocalStore>,
    queue: Arc<MutationQueue>,
    transport: Arc<dyn Transport>,
    in_progress: AtomicBool,
    pass_gate: AsyncMutex<()>,
    listeners: ListenerSet<SyncReport>,
}

impl SyncCoordinator {
    /// Creates a coordinator over the given collection configurations.
    pub fn new(
        config: SyncConfig,
        collections: Vec<RepositoryConfig>,
        store: Arc<dyn LocalStore>,
        queue: Arc<MutationQueue>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            collections: collections
                .into_iter()
                .map(|c| (c.collection.clone(), c))
                .collect(),
            store,
            queue,
            transport,
            in_progress: AtomicBool::new(false),
            pass_gate: AsyncMutex::new(()),
            listeners: ListenerSet::new(),
        }
    }

    /// True while a sync pass is running.
    #[must_use]
    pub fn is_sync_in_progress(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Registers a listener for per-pass reports.
    ///
    /// The returned [`Subscription`] unsubscribes on drop.
    pub fn on_sync_complete(
        &self,
        callback: impl Fn(&SyncReport) + Send + Sync + 'static,
    ) -> Subscription {
        self.listeners.subscribe(callback)
    }

    /// Runs a sync pass now and returns its report.
    ///
    /// Concurrent calls queue behind the in-flight pass; each caller gets
    /// the report of its own (possibly empty) pass.
    pub async fn force_sync_now(&self) -> SyncReport {
        let _gate = self.pass_gate.lock().await;
        self.in_progress.store(true, Ordering::SeqCst);
        let report = self.drain().await;
        self.in_progress.store(false, Ordering::SeqCst);

        tracing::info!(
            success = report.success,
            failed = report.failed,
            "sync pass complete"
        );
        self.listeners.emit(&report);
        report
    }

    /// Triggers a sync pass whenever `monitor` transitions to online.
    ///
    /// The subscription also fires immediately if the monitor is already
    /// online, draining anything queued before the watcher was attached.
    /// The watcher holds only a weak handle, so it does not keep the
    /// coordinator alive; keep the returned [`Subscription`] alive for as
    /// long as reconnect replay should stay armed.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn watch(self: Arc<Self>, monitor: &NetworkMonitor) -> Subscription {
        let coordinator = Arc::downgrade(&self);
        let handle = tokio::runtime::Handle::current();
        monitor.on_status_change(move |status| {
            if !status.online {
                return;
            }
            let Some(coordinator) = coordinator.upgrade() else {
                return;
            };
            tracing::debug!("back online, scheduling sync pass");
            handle.spawn(async move {
                coordinator.force_sync_now().await;
            });
        })
    }

    async fn drain(&self) -> SyncReport {
        let pending = match self.queue.pending().await {
            Ok(pending) => pending,
            Err(err) => {
                return SyncReport {
                    success: 0,
                    failed: 0,
                    errors: vec![format!("could not read mutation queue: {err}")],
                }
            }
        };
        if pending.is_empty() {
            return SyncReport::default();
        }

        // group per collection, preserving FIFO within each group
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, Vec<Mutation>> = HashMap::new();
        for mutation in pending {
            if !groups.contains_key(&mutation.collection) {
                order.push(mutation.collection.clone());
            }
            groups.entry(mutation.collection.clone()).or_default().push(mutation);
        }

        let mut handles = Vec::with_capacity(order.len());
        for collection in order {
            let mutations = groups.remove(&collection).unwrap_or_default();
            let worker = CollectionReplay {
                config: self.collection_config(&collection),
                retry_budget: self.config.retry_budget,
                change_retry_delay: self.config.change_retry_delay,
                store: Arc::clone(&self.store),
                queue: Arc::clone(&self.queue),
                transport: Arc::clone(&self.transport),
            };
            handles.push(tokio::spawn(async move { worker.replay(mutations).await }));
        }

        let mut report = SyncReport::default();
        for handle in handles {
            match handle.await {
                Ok(partial) => report.merge(partial),
                Err(err) => report
                    .errors
                    .push(format!("collection replay task failed: {err}")),
            }
        }
        report
    }

    fn collection_config(&self, collection: &str) -> RepositoryConfig {
        self.collections.get(collection).cloned().unwrap_or_else(|| {
            // unknown collections still replay; guess the singular form
            let singular = collection.trim_end_matches('s').to_string();
            RepositoryConfig::new(collection.to_string(), singular)
        })
    }
}

/// Sequential replay of one collection's mutations.
struct CollectionReplay {
    config: RepositoryConfig,
    retry_budget: u32,
    change_retry_delay: std::time::Duration,
    store: Arc<dyn LocalStore>,
    queue: Arc<MutationQueue>,
    transport: Arc<dyn Transport>,
}

impl CollectionReplay {
    async fn replay(self, mutations: Vec<Mutation>) -> SyncReport {
        let mut report = SyncReport::default();
        // records whose earlier mutation failed this pass; later mutations
        // for them must wait for the next pass
        let mut blocked: HashSet<String> = HashSet::new();
        // id rewrites from creates confirmed earlier in this pass; the
        // snapshot was taken before the queue was rekeyed
        let mut rekeys: HashMap<String, RecordId> = HashMap::new();

        for mut mutation in mutations {
            if let Some(server_id) = rekeys.get(mutation.record_id.as_str()) {
                remap(&mut mutation, server_id);
            }
            if blocked.contains(mutation.record_id.as_str()) {
                continue;
            }

            match self.apply(&mutation).await {
                Outcome::Confirmed { rekey } => {
                    report.success += 1;
                    if let Some((temp, server_id)) = rekey {
                        rekeys.insert(temp, server_id);
                    }
                }
                Outcome::Unauthorized => {
                    tracing::warn!(
                        collection = %self.config.collection,
                        "unauthorized during sync, aborting pass"
                    );
                    report.failed += 1;
                    report
                        .errors
                        .push("unauthorized: sync pass aborted, mutations kept".to_string());
                    break;
                }
                Outcome::Failed(message) => {
                    report.failed += 1;
                    blocked.insert(mutation.record_id.as_str().to_string());
                    self.account_failure(&mutation, &message, &mut report).await;
                }
                Outcome::Orphaned => {
                    report.failed += 1;
                    let _ = self.queue.remove(mutation.seq).await;
                    report.errors.push(format!(
                        "{} on {} {}: dropped, targets an unconfirmed record with no queued create",
                        mutation.kind.as_str(),
                        self.config.collection,
                        mutation.record_id,
                    ));
                }
            }
        }
        report
    }

    async fn account_failure(&self, mutation: &Mutation, message: &str, report: &mut SyncReport) {
        let attempts = match self.queue.record_attempt(mutation.seq).await {
            Ok(attempts) => attempts,
            Err(err) => {
                report
                    .errors
                    .push(format!("could not record replay attempt: {err}"));
                return;
            }
        };

        if attempts >= self.retry_budget {
            let _ = self.queue.remove(mutation.seq).await;
            tracing::warn!(
                collection = %self.config.collection,
                record = %mutation.record_id,
                attempts,
                "mutation dropped after exhausting its retry budget"
            );
            report.errors.push(format!(
                "{} on {} {}: permanent failure after {attempts} attempts: {message}",
                mutation.kind.as_str(),
                self.config.collection,
                mutation.record_id,
            ));
        } else {
            report.errors.push(format!(
                "{} on {} {}: attempt {attempts}/{}: {message}",
                mutation.kind.as_str(),
                self.config.collection,
                mutation.record_id,
                self.retry_budget,
            ));
        }
    }

    async fn apply(&self, mutation: &Mutation) -> Outcome {
        match mutation.kind {
            MutationKind::Create => self.apply_create(mutation).await,
            // a temporary id here means the create it depends on is no
            // longer in the queue; the operation can never be sent
            _ if mutation.record_id.is_temp() => Outcome::Orphaned,
            MutationKind::Update => self.apply_update(mutation).await,
            MutationKind::Delete => self.apply_delete(mutation).await,
        }
    }

    async fn apply_create(&self, mutation: &Mutation) -> Outcome {
        let body = creation_body(&mutation.payload);
        let response = match self
            .send(Method::Post, &self.config.list_path(), Some(body))
            .await
        {
            Ok(response) => response,
            Err(err) => return outcome_from(err),
        };

        let Some(doc) = self.config.unwrap_record(&response.data) else {
            return Outcome::Failed("create response carried no record".to_string());
        };
        let Some(server_id) = doc.get("id").and_then(Value::as_str).map(RecordId::parse) else {
            return Outcome::Failed("create response record has no id".to_string());
        };

        // re-key the cache: the temporary document goes away, the
        // confirmed one takes its place
        let temp = mutation.record_id.as_str().to_string();
        if let Err(err) = self.store.delete(&self.config.collection, &temp).await {
            return Outcome::Failed(format!("could not evict temporary record: {err}"));
        }
        if let Err(err) = self
            .store
            .put(&self.config.collection, server_id.as_str(), doc)
            .await
        {
            return Outcome::Failed(format!("could not cache confirmed record: {err}"));
        }
        if let Err(err) = self
            .queue
            .rekey(&self.config.collection, &mutation.record_id, &server_id)
            .await
        {
            return Outcome::Failed(format!("could not rekey queued mutations: {err}"));
        }
        if let Err(err) = self.queue.remove(mutation.seq).await {
            return Outcome::Failed(format!("could not retire mutation: {err}"));
        }

        tracing::debug!(
            collection = %self.config.collection,
            temp = %temp,
            confirmed = %server_id,
            "queued create confirmed"
        );
        Outcome::Confirmed {
            rekey: Some((temp, server_id)),
        }
    }

    async fn apply_update(&self, mutation: &Mutation) -> Outcome {
        let path = self.config.record_path(&mutation.record_id);
        let body = update_body(&mutation.payload);
        let response = match self.send(Method::Put, &path, Some(body)).await {
            Ok(response) => response,
            Err(err) => return outcome_from(err),
        };

        // prefer the server's view of the record; fall back to what we sent
        let doc = self
            .config
            .unwrap_record(&response.data)
            .unwrap_or_else(|| update_body(&mutation.payload));
        if let Err(err) = self
            .store
            .put(&self.config.collection, mutation.record_id.as_str(), doc)
            .await
        {
            return Outcome::Failed(format!("could not cache confirmed record: {err}"));
        }
        if let Err(err) = self.queue.remove(mutation.seq).await {
            return Outcome::Failed(format!("could not retire mutation: {err}"));
        }
        Outcome::Confirmed { rekey: None }
    }

    async fn apply_delete(&self, mutation: &Mutation) -> Outcome {
        let path = self.config.record_path(&mutation.record_id);
        match self.send(Method::Delete, &path, None).await {
            Ok(_) => {}
            // already gone server-side; that is the state we wanted
            Err(TransportError::Status { code: 404, .. }) => {}
            Err(err) => return outcome_from(err),
        }
        if let Err(err) = self.queue.remove(mutation.seq).await {
            return Outcome::Failed(format!("could not retire mutation: {err}"));
        }
        Outcome::Confirmed { rekey: None }
    }

    /// Sends one request, retrying exactly once after a network-change
    /// error.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<ApiResponse, TransportError> {
        match self.transport.request(method, path, body.clone()).await {
            Err(TransportError::NetworkChanged) => {
                tokio::time::sleep(self.change_retry_delay).await;
                self.transport.request(method, path, body).await
            }
            other => other,
        }
    }
}

fn outcome_from(err: TransportError) -> Outcome {
    match err {
        TransportError::Unauthorized => Outcome::Unauthorized,
        other => Outcome::Failed(other.to_string()),
    }
}

fn remap(mutation: &mut Mutation, to: &RecordId) {
    mutation.record_id = to.clone();
    if let Some(map) = mutation.payload.as_object_mut() {
        if map.contains_key("id") {
            map.insert("id".into(), Value::String(to.as_str().to_string()));
        }
    }
}
