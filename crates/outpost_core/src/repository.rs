//! Generic per-collection repository.

use crate::config::RepositoryConfig;
use crate::connectivity::Connectivity;
use crate::entity::{self, id::RecordId, stamp, Entity};
use crate::error::{RepoError, RepoResult};
use crate::queue::{MutationKind, MutationQueue};
use outpost_store::LocalStore;
use outpost_transport::{ApiResponse, Method, Transport, TransportError};
use serde_json::{json, Value};
use std::marker::PhantomData;
use std::sync::Arc;

/// One uniform CRUD contract per collection.
///
/// The repository hides whether the current write path is "talk to the
/// server" or "queue for later": reads are network-first with a cache
/// fallback, writes are offline-first with an online fast path. Callers
/// only ever see validation errors, authorization errors, not-found on
/// offline updates, and local-store faults - a flaky network is not their
/// problem.
///
/// One instance exists per collection, all sharing the store, queue,
/// connectivity source, and transport.
pub struct EntityRepository<T: Entity> {
    config: RepositoryConfig,
    store: Arc<dyn LocalStore>,
    queue: Arc<MutationQueue>,
    connectivity: Arc<dyn Connectivity>,
    transport: Arc<dyn Transport>,
    _record: PhantomData<fn() -> T>,
}

impl<T: Entity> EntityRepository<T> {
    /// Creates a repository for one collection.
    pub fn new(
        config: RepositoryConfig,
        store: Arc<dyn LocalStore>,
        queue: Arc<MutationQueue>,
        connectivity: Arc<dyn Connectivity>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config,
            store,
            queue,
            connectivity,
            transport,
            _record: PhantomData,
        }
    }

    /// Returns this repository's configuration.
    #[must_use]
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// Returns every record in the collection.
    ///
    /// Online: fetches the server list, drops records with a locally
    /// queued delete, refreshes the cache in the background, and applies
    /// soft-delete filtering. Offline (or when the fetch fails): serves
    /// the same reconciled view from the local cache.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Unauthorized`] on a rejected session, or a
    /// store/decode error if the local cache is unreadable. Transient
    /// network failures never surface here.
    pub async fn get_all(&self) -> RepoResult<Vec<T>> {
        if self.connectivity.is_online() {
            match self.fetch_all().await {
                Ok(records) => return Ok(records),
                Err(RepoError::Unauthorized) => return Err(RepoError::Unauthorized),
                Err(err) if err.is_offline_fallback() => {
                    tracing::warn!(
                        collection = %self.config.collection,
                        error = %err,
                        "online fetch failed, serving local cache"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        self.read_local().await
    }

    /// Creates a record.
    ///
    /// Online: POSTs and returns the server-confirmed record. Offline (or
    /// when the request fails transiently): mints a temporary id, stamps
    /// the envelope, commits locally, queues a create mutation, and
    /// returns the optimistic record immediately with `pending = true`.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Validation`] before any I/O if the record is
    /// invalid, [`RepoError::Unauthorized`] on a rejected session, or a
    /// store error if the local commit fails.
    pub async fn create(&self, record: T) -> RepoResult<T> {
        record.validate()?;

        if self.connectivity.is_online() {
            match self.create_online(&record).await {
                Ok(confirmed) => return Ok(confirmed),
                Err(RepoError::Unauthorized) => return Err(RepoError::Unauthorized),
                Err(err) if err.is_offline_fallback() => {
                    tracing::warn!(
                        collection = %self.config.collection,
                        error = %err,
                        "online create failed, queueing for sync"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        self.create_offline(record).await
    }

    /// Applies a partial update to a record.
    ///
    /// The patch must be a JSON object; its fields are shallow-merged over
    /// the record. Online with a server id: PUTs and returns the confirmed
    /// record. Offline, or when the id is temporary, or when the request
    /// fails transiently: merges into the cached record, re-validates,
    /// marks it pending, and queues an update mutation.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Validation`] for a non-object patch or an
    /// invalid merged record, [`RepoError::NotFound`] if the offline path
    /// finds no cached record, [`RepoError::Unauthorized`] on a rejected
    /// session, or a store error.
    pub async fn update(&self, id: &RecordId, patch: Value) -> RepoResult<T> {
        if !patch.is_object() {
            return Err(RepoError::validation("update patch must be a JSON object"));
        }

        if self.connectivity.is_online() && !id.is_temp() {
            match self.update_online(id, &patch).await {
                Ok(confirmed) => return Ok(confirmed),
                Err(RepoError::Unauthorized) => return Err(RepoError::Unauthorized),
                Err(err) if err.is_offline_fallback() => {
                    tracing::warn!(
                        collection = %self.config.collection,
                        record = %id,
                        error = %err,
                        "online update failed, queueing for sync"
                    );
                }
                Err(err) => return Err(err),
            }
        }
        self.update_offline(id, patch).await
    }

    /// Deletes a record.
    ///
    /// Online with a server id: deletes on the server and locally,
    /// concurrently. Offline, or when the id is temporary, or when the
    /// request fails transiently: deletes locally and queues a delete
    /// mutation - except for temporary ids, which were never confirmed by
    /// the server and so have nothing to delete remotely.
    ///
    /// # Errors
    ///
    /// Returns [`RepoError::Unauthorized`] on a rejected session, or a
    /// store error if the local delete fails.
    pub async fn delete(&self, id: &RecordId) -> RepoResult<()> {
        if self.connectivity.is_online() && !id.is_temp() {
            let record_path = self.config.record_path(id);
            let (remote, local) = tokio::join!(
                self.send(Method::Delete, &record_path, None),
                self.store.delete(&self.config.collection, id.as_str()),
            );
            match remote {
                Ok(_) => {
                    local?;
                    return Ok(());
                }
                Err(RepoError::Unauthorized) => return Err(RepoError::Unauthorized),
                Err(err) if err.is_offline_fallback() => {
                    // the offline path below repeats the local delete
                    let _ = local;
                    tracing::warn!(
                        collection = %self.config.collection,
                        record = %id,
                        error = %err,
                        "online delete failed, queueing for sync"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        self.store.delete(&self.config.collection, id.as_str()).await?;
        if id.is_temp() {
            // never confirmed by the server: nothing to delete remotely,
            // and its queued create/updates must not replay
            self.queue.discard_record(&self.config.collection, id).await?;
        } else {
            self.queue
                .enqueue(
                    &self.config.collection,
                    MutationKind::Delete,
                    id.clone(),
                    json!({ "id": id.as_str() }),
                )
                .await?;
        }
        Ok(())
    }

    async fn fetch_all(&self) -> RepoResult<Vec<T>> {
        let list_path = self.config.list_path();
        let (response, deleted) = tokio::join!(
            self.send(Method::Get, &list_path, None),
            self.queue.queued_delete_ids(&self.config.collection),
        );
        let response = response?;
        let deleted = deleted?;

        let raw = self
            .config
            .unwrap_list(&response.data)
            .ok_or_else(|| bad_payload("expected a record list"))?;

        // records the user deleted locally must not reappear before the
        // server has confirmed the deletion
        let reconciled: Vec<Value> = raw
            .into_iter()
            .filter(|doc| match doc.get("id").and_then(Value::as_str) {
                Some(id) => !deleted.contains(id),
                None => true,
            })
            .collect();

        self.refresh_cache_in_background(&reconciled);

        let mut records = Vec::with_capacity(reconciled.len());
        for doc in reconciled {
            let record: T =
                entity::from_document(doc).map_err(|_| bad_payload("undecodable record"))?;
            records.push(record);
        }
        if self.config.soft_delete {
            records.retain(|record| !record.is_deleted());
        }
        Ok(records)
    }

    /// Replaces the local cache with the reconciled server view without
    /// blocking the read that produced it.
    fn refresh_cache_in_background(&self, documents: &[Value]) {
        let cache: Vec<(String, Value)> = documents
            .iter()
            .filter_map(|doc| {
                let id = doc.get("id")?.as_str()?;
                Some((id.to_string(), doc.clone()))
            })
            .collect();
        let store = Arc::clone(&self.store);
        let collection = self.config.collection.clone();
        tokio::spawn(async move {
            if let Err(err) = store.replace_all(&collection, cache).await {
                tracing::warn!(collection = %collection, error = %err, "cache refresh failed");
            }
        });
    }

    async fn read_local(&self) -> RepoResult<Vec<T>> {
        let (docs, deleted) = tokio::join!(
            self.store.get_all(&self.config.collection),
            self.queue.queued_delete_ids(&self.config.collection),
        );
        let docs = docs?;
        let deleted = deleted?;

        let mut records: Vec<T> = Vec::with_capacity(docs.len());
        for doc in docs {
            match entity::from_document(doc) {
                Ok(record) => records.push(record),
                Err(err) => {
                    tracing::warn!(
                        collection = %self.config.collection,
                        error = %err,
                        "skipping undecodable cached document"
                    );
                }
            }
        }
        records.retain(|record| !deleted.contains(record.id().as_str()));
        if self.config.soft_delete {
            records.retain(|record| !record.is_deleted());
        }
        Ok(records)
    }

    async fn create_online(&self, record: &T) -> RepoResult<T> {
        let body = entity::creation_body(&entity::to_document(record)?);
        let response = self
            .send(Method::Post, &self.config.list_path(), Some(body))
            .await?;
        let doc = self
            .config
            .unwrap_record(&response.data)
            .ok_or_else(|| bad_payload("expected the created record"))?;
        let confirmed: T = entity::from_document(doc.clone())
            .map_err(|_| bad_payload("undecodable created record"))?;
        self.store
            .put(&self.config.collection, confirmed.id().as_str(), doc)
            .await?;
        Ok(confirmed)
    }

    async fn create_offline(&self, mut record: T) -> RepoResult<T> {
        let id = RecordId::temp();
        let now = stamp::now_rfc3339();
        record.set_id(id.clone());
        record.set_created_at(now.clone());
        record.set_updated_at(now);
        record.set_pending(true);
        record.set_last_modified(stamp::now_millis());

        let doc = entity::to_document(&record)?;
        let (put, queued) = tokio::join!(
            self.store.put(&self.config.collection, id.as_str(), doc.clone()),
            self.queue
                .enqueue(&self.config.collection, MutationKind::Create, id.clone(), doc),
        );
        put?;
        queued?;
        Ok(record)
    }

    async fn update_online(&self, id: &RecordId, patch: &Value) -> RepoResult<T> {
        let response = self
            .send(Method::Put, &self.config.record_path(id), Some(patch.clone()))
            .await?;
        let doc = self
            .config
            .unwrap_record(&response.data)
            .ok_or_else(|| bad_payload("expected the updated record"))?;
        let confirmed: T = entity::from_document(doc.clone())
            .map_err(|_| bad_payload("undecodable updated record"))?;
        self.store
            .put(&self.config.collection, confirmed.id().as_str(), doc)
            .await?;
        Ok(confirmed)
    }

    async fn update_offline(&self, id: &RecordId, patch: Value) -> RepoResult<T> {
        let mut doc = self
            .store
            .get_by_id(&self.config.collection, id.as_str())
            .await?
            .ok_or_else(|| RepoError::not_found(&self.config.collection, id.as_str()))?;

        merge_patch(&mut doc, patch);

        let mut record: T = entity::from_document(doc)
            .map_err(|_| RepoError::validation("patch does not fit the record shape"))?;
        record.set_pending(true);
        record.set_updated_at(stamp::now_rfc3339());
        record.set_last_modified(stamp::now_millis());
        record.validate()?;

        let doc = entity::to_document(&record)?;
        let (put, queued) = tokio::join!(
            self.store.put(&self.config.collection, id.as_str(), doc.clone()),
            self.queue
                .enqueue(&self.config.collection, MutationKind::Update, id.clone(), doc),
        );
        put?;
        queued?;
        Ok(record)
    }

    /// Sends one request, retrying exactly once after a network-change
    /// error before treating it as a real failure.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> RepoResult<ApiResponse> {
        match self.transport.request(method, path, body.clone()).await {
            Err(TransportError::NetworkChanged) => {
                tracing::debug!(%method, path, "network changed mid-request, retrying once");
                tokio::time::sleep(self.config.retry_delay).await;
                Ok(self.transport.request(method, path, body).await?)
            }
            other => Ok(other?),
        }
    }
}

/// Shallow-merges a patch object into a document.
///
/// The record's identity and creation stamp are not patchable.
fn merge_patch(doc: &mut Value, patch: Value) {
    let (Some(target), Value::Object(fields)) = (doc.as_object_mut(), patch) else {
        return;
    };
    for (key, value) in fields {
        if key == "id" || key == "createdAt" {
            continue;
        }
        target.insert(key, value);
    }
}

fn bad_payload(message: &str) -> RepoError {
    RepoError::Network(TransportError::invalid_response(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::StaticConnectivity;
    use outpost_store::MemoryStore;
    use outpost_transport::MockTransport;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Part {
        id: RecordId,
        name: String,
        #[serde(default)]
        created_at: String,
        #[serde(default)]
        updated_at: String,
        #[serde(default)]
        pending: bool,
        #[serde(default)]
        last_modified: i64,
        #[serde(default)]
        is_deleted: bool,
    }

    impl Part {
        fn draft(name: &str) -> Self {
            Self {
                id: RecordId::server(""),
                name: name.to_string(),
                created_at: String::new(),
                updated_at: String::new(),
                pending: false,
                last_modified: 0,
                is_deleted: false,
            }
        }
    }

    impl Entity for Part {
        fn id(&self) -> &RecordId {
            &self.id
        }
        fn set_id(&mut self, id: RecordId) {
            self.id = id;
        }
        fn created_at(&self) -> &str {
            &self.created_at
        }
        fn set_created_at(&mut self, at: String) {
            self.created_at = at;
        }
        fn updated_at(&self) -> &str {
            &self.updated_at
        }
        fn set_updated_at(&mut self, at: String) {
            self.updated_at = at;
        }
        fn pending(&self) -> bool {
            self.pending
        }
        fn set_pending(&mut self, pending: bool) {
            self.pending = pending;
        }
        fn last_modified(&self) -> i64 {
            self.last_modified
        }
        fn set_last_modified(&mut self, at_ms: i64) {
            self.last_modified = at_ms;
        }
        fn is_deleted(&self) -> bool {
            self.is_deleted
        }
        fn validate(&self) -> RepoResult<()> {
            if self.name.trim().is_empty() {
                return Err(RepoError::validation("name is required"));
            }
            Ok(())
        }
    }

    struct Fixture {
        store: Arc<MemoryStore>,
        queue: Arc<MutationQueue>,
        connectivity: Arc<StaticConnectivity>,
        transport: Arc<MockTransport>,
        repo: EntityRepository<Part>,
    }

    async fn fixture(online: bool) -> Fixture {
        fixture_with(online, RepositoryConfig::new("parts", "part")).await
    }

    async fn fixture_with(online: bool, config: RepositoryConfig) -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let queue = Arc::new(MutationQueue::open(store.clone()).await.unwrap());
        let connectivity = Arc::new(if online {
            StaticConnectivity::online()
        } else {
            StaticConnectivity::offline()
        });
        let transport = Arc::new(MockTransport::new());
        let repo = EntityRepository::new(
            config.with_retry_delay(Duration::from_millis(1)),
            store.clone(),
            queue.clone(),
            connectivity.clone(),
            transport.clone(),
        );
        Fixture {
            store,
            queue,
            connectivity,
            transport,
            repo,
        }
    }

    #[tokio::test]
    async fn online_create_returns_server_record_and_caches_it() {
        let fx = fixture(true).await;
        fx.transport.enqueue_ok(
            Method::Post,
            "/parts",
            json!({"part": {"id": "part-1", "name": "Brake pad"}}),
        );

        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();
        assert_eq!(created.id, RecordId::server("part-1"));
        assert!(!created.pending);

        let cached = fx.store.get_by_id("parts", "part-1").await.unwrap();
        assert!(cached.is_some());
        assert!(fx.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn create_validates_before_any_io() {
        let fx = fixture(true).await;
        let err = fx.repo.create(Part::draft("  ")).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
        assert!(fx.transport.requests().is_empty());
        assert!(fx.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn offline_create_returns_pending_temp_record_and_queues_once() {
        let fx = fixture(false).await;

        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();
        assert!(created.id.is_temp());
        assert!(created.pending);
        assert!(!created.created_at.is_empty());

        assert_eq!(fx.queue.len().await.unwrap(), 1);
        let pending = fx.queue.pending().await.unwrap();
        assert_eq!(pending[0].kind, MutationKind::Create);
        assert_eq!(pending[0].record_id, created.id);
        assert!(fx.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn create_falls_back_offline_on_transient_failure() {
        let fx = fixture(true).await;
        fx.transport.set_outage(TransportError::Timeout);

        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();
        assert!(created.id.is_temp());
        assert!(created.pending);
        assert_eq!(fx.queue.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn unauthorized_create_is_rethrown_without_queue_side_effect() {
        let fx = fixture(true).await;
        fx.transport
            .enqueue_err(Method::Post, "/parts", TransportError::Unauthorized);

        let err = fx.repo.create(Part::draft("Brake pad")).await.unwrap_err();
        assert!(matches!(err, RepoError::Unauthorized));
        assert!(fx.queue.is_empty().await.unwrap());
        assert!(fx.store.is_empty("parts"));
    }

    #[tokio::test]
    async fn network_changed_is_retried_exactly_once() {
        let fx = fixture(true).await;
        fx.transport
            .enqueue_err(Method::Post, "/parts", TransportError::NetworkChanged);
        fx.transport.enqueue_ok(
            Method::Post,
            "/parts",
            json!({"id": "part-1", "name": "Brake pad"}),
        );

        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();
        assert_eq!(created.id, RecordId::server("part-1"));
        assert_eq!(fx.transport.request_count(Method::Post, "/parts"), 2);
    }

    #[tokio::test]
    async fn get_all_online_filters_queued_deletes_and_refreshes_cache() {
        let fx = fixture(true).await;
        fx.queue
            .enqueue(
                "parts",
                MutationKind::Delete,
                RecordId::server("part-2"),
                json!({"id": "part-2"}),
            )
            .await
            .unwrap();
        fx.transport.enqueue_ok(
            Method::Get,
            "/parts",
            json!({"parts": [
                {"id": "part-1", "name": "Brake pad"},
                {"id": "part-2", "name": "Oil filter"},
            ]}),
        );

        let records = fx.repo.get_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::server("part-1"));

        // cache refresh runs off the read path
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(fx.store.get_by_id("parts", "part-1").await.unwrap().is_some());
        assert!(fx.store.get_by_id("parts", "part-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn get_all_falls_back_to_cache_on_fetch_failure() {
        let fx = fixture(true).await;
        fx.store
            .put("parts", "part-1", json!({"id": "part-1", "name": "Brake pad"}))
            .await
            .unwrap();
        fx.transport.set_outage(TransportError::connection("refused"));

        let records = fx.repo.get_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Brake pad");
    }

    #[tokio::test]
    async fn get_all_offline_merges_cache_minus_queued_deletes() {
        let fx = fixture(false).await;
        fx.store
            .put("parts", "part-1", json!({"id": "part-1", "name": "Brake pad"}))
            .await
            .unwrap();
        fx.store
            .put("parts", "part-2", json!({"id": "part-2", "name": "Oil filter"}))
            .await
            .unwrap();
        fx.queue
            .enqueue(
                "parts",
                MutationKind::Delete,
                RecordId::server("part-2"),
                json!({"id": "part-2"}),
            )
            .await
            .unwrap();

        let records = fx.repo.get_all().await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, RecordId::server("part-1"));
        assert!(fx.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn get_all_unauthorized_is_rethrown() {
        let fx = fixture(true).await;
        fx.transport
            .enqueue_err(Method::Get, "/parts", TransportError::Unauthorized);

        let err = fx.repo.get_all().await.unwrap_err();
        assert!(matches!(err, RepoError::Unauthorized));
    }

    #[tokio::test]
    async fn soft_delete_filtering_applies_on_both_paths() {
        let config = RepositoryConfig::new("parts", "part").with_soft_delete(true);
        let fx = fixture_with(true, config).await;
        fx.transport.enqueue_ok(
            Method::Get,
            "/parts",
            json!([
                {"id": "part-1", "name": "Brake pad"},
                {"id": "part-2", "name": "Oil filter", "isDeleted": true},
            ]),
        );

        let online = fx.repo.get_all().await.unwrap();
        assert_eq!(online.len(), 1);

        fx.connectivity.set_online(false);
        fx.store
            .put(
                "parts",
                "part-3",
                json!({"id": "part-3", "name": "Wiper", "isDeleted": true}),
            )
            .await
            .unwrap();
        let offline = fx.repo.get_all().await.unwrap();
        assert!(offline.iter().all(|part| !part.is_deleted));
    }

    #[tokio::test]
    async fn online_update_puts_and_caches_confirmed_record() {
        let fx = fixture(true).await;
        fx.transport.enqueue_ok(
            Method::Put,
            "/parts/part-1",
            json!({"id": "part-1", "name": "Ceramic brake pad"}),
        );

        let id = RecordId::server("part-1");
        let updated = fx
            .repo
            .update(&id, json!({"name": "Ceramic brake pad"}))
            .await
            .unwrap();
        assert_eq!(updated.name, "Ceramic brake pad");

        let cached = fx.store.get_by_id("parts", "part-1").await.unwrap().unwrap();
        assert_eq!(cached["name"], "Ceramic brake pad");
        assert!(fx.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn update_rejects_non_object_patch() {
        let fx = fixture(true).await;
        let id = RecordId::server("part-1");
        let err = fx.repo.update(&id, json!("nope")).await.unwrap_err();
        assert!(matches!(err, RepoError::Validation { .. }));
        assert!(fx.transport.requests().is_empty());
    }

    #[tokio::test]
    async fn offline_update_merges_and_queues() {
        let fx = fixture(false).await;
        fx.store
            .put(
                "parts",
                "part-1",
                json!({"id": "part-1", "name": "Brake pad", "createdAt": "2026-01-01T00:00:00Z"}),
            )
            .await
            .unwrap();

        let id = RecordId::server("part-1");
        let updated = fx
            .repo
            .update(&id, json!({"name": "Ceramic brake pad", "createdAt": "1999-01-01T00:00:00Z"}))
            .await
            .unwrap();

        assert_eq!(updated.name, "Ceramic brake pad");
        assert!(updated.pending);
        // identity and creation stamp are not patchable
        assert_eq!(updated.created_at, "2026-01-01T00:00:00Z");

        let pending = fx.queue.pending().await.unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].kind, MutationKind::Update);
    }

    #[tokio::test]
    async fn offline_update_of_missing_record_is_not_found() {
        let fx = fixture(false).await;
        let id = RecordId::server("ghost");
        let err = fx.repo.update(&id, json!({"name": "x"})).await.unwrap_err();
        assert!(matches!(err, RepoError::NotFound { .. }));
        assert!(fx.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn update_of_temp_record_stays_local_even_when_online() {
        let fx = fixture(false).await;
        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();

        fx.connectivity.set_online(true);
        let updated = fx
            .repo
            .update(created.id(), json!({"name": "Ceramic brake pad"}))
            .await
            .unwrap();

        assert!(updated.id.is_temp());
        assert!(fx.transport.requests().is_empty());
        assert_eq!(fx.queue.len().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn online_delete_hits_server_and_cache() {
        let fx = fixture(true).await;
        fx.store
            .put("parts", "part-1", json!({"id": "part-1", "name": "Brake pad"}))
            .await
            .unwrap();
        fx.transport
            .enqueue_ok(Method::Delete, "/parts/part-1", json!({}));

        fx.repo.delete(&RecordId::server("part-1")).await.unwrap();
        assert!(fx.store.is_empty("parts"));
        assert!(fx.queue.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn offline_delete_queues_only_server_ids() {
        let fx = fixture(false).await;
        let created = fx.repo.create(Part::draft("Brake pad")).await.unwrap();
        assert_eq!(fx.queue.len().await.unwrap(), 1);

        // deleting a never-confirmed record queues nothing and discards
        // its pending create
        fx.repo.delete(created.id()).await.unwrap();
        assert!(fx.queue.is_empty().await.unwrap());

        fx.store
            .put("parts", "part-9", json!({"id": "part-9", "name": "Hose"}))
            .await
            .unwrap();
        fx.repo.delete(&RecordId::server("part-9")).await.unwrap();
        let deletes = fx.queue.queued_delete_ids("parts").await.unwrap();
        assert!(deletes.contains("part-9"));
    }
}
