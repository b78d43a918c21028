//! Durable mutation queue.

use crate::entity::id::RecordId;
use crate::entity::stamp;
use crate::error::RepoResult;
use outpost_store::LocalStore;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Reserved store collection holding queued mutations.
pub const QUEUE_COLLECTION: &str = "_mutation_queue";

/// Kind of queued write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    /// Record creation.
    Create,
    /// Partial or full record update.
    Update,
    /// Record removal.
    Delete,
}

impl MutationKind {
    /// Returns the lowercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Create => "create",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }
}

/// One queued write that could not be confirmed by the server when it was
/// made.
///
/// Mutations are appended by repositories, drained FIFO by the sync
/// coordinator, removed on success, and retried on recoverable failure
/// until a bounded budget is exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Mutation {
    /// Queue-local monotonic sequence; FIFO order within a collection.
    pub seq: u64,
    /// Collection the write targets.
    pub collection: String,
    /// Kind of write.
    pub kind: MutationKind,
    /// Identity of the targeted record.
    pub record_id: RecordId,
    /// Document snapshot to replay (for deletes, just the id).
    pub payload: Value,
    /// Epoch-millisecond the mutation was queued.
    pub queued_at_ms: i64,
    /// Replay attempts so far.
    pub retry_count: u32,
}

/// Durable, ordered record of unconfirmed writes.
///
/// Backed by any [`LocalStore`] under the reserved [`QUEUE_COLLECTION`]:
/// each mutation is one document keyed by its zero-padded sequence, so the
/// store's key ordering *is* FIFO order and the queue survives restarts
/// for free. Removal is idempotent, which is what makes concurrent sync
/// passes safe.
pub struct MutationQueue {
    store: Arc<dyn LocalStore>,
    next_seq: AtomicU64,
}

impl MutationQueue {
    /// Opens the queue, recovering the sequence counter from any
    /// mutations already persisted.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read or decoded.
    pub async fn open(store: Arc<dyn LocalStore>) -> RepoResult<Self> {
        let pending = Self::load(store.as_ref()).await?;
        let next_seq = pending.last().map(|m| m.seq + 1).unwrap_or(1);
        if !pending.is_empty() {
            tracing::info!(count = pending.len(), "recovered queued mutations");
        }
        Ok(Self {
            store,
            next_seq: AtomicU64::new(next_seq),
        })
    }

    fn key(seq: u64) -> String {
        format!("{seq:020}")
    }

    async fn load(store: &dyn LocalStore) -> RepoResult<Vec<Mutation>> {
        let docs = store.get_all(QUEUE_COLLECTION).await?;
        let mut mutations = Vec::with_capacity(docs.len());
        for doc in docs {
            mutations.push(serde_json::from_value(doc)?);
        }
        Ok(mutations)
    }

    /// Appends a mutation and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation cannot be persisted.
    pub async fn enqueue(
        &self,
        collection: &str,
        kind: MutationKind,
        record_id: RecordId,
        payload: Value,
    ) -> RepoResult<Mutation> {
        let seq = self.next_seq.fetch_add(1, Ordering::SeqCst);
        let mutation = Mutation {
            seq,
            collection: collection.to_string(),
            kind,
            record_id,
            payload,
            queued_at_ms: stamp::now_millis(),
            retry_count: 0,
        };
        self.store
            .put(
                QUEUE_COLLECTION,
                &Self::key(seq),
                serde_json::to_value(&mutation)?,
            )
            .await?;
        tracing::debug!(
            collection,
            kind = kind.as_str(),
            seq,
            record = %mutation.record_id,
            "queued mutation"
        );
        Ok(mutation)
    }

    /// Returns every pending mutation in FIFO order.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read or decoded.
    pub async fn pending(&self) -> RepoResult<Vec<Mutation>> {
        Self::load(self.store.as_ref()).await
    }

    /// Returns the pending mutations for one collection, FIFO.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read or decoded.
    pub async fn pending_for(&self, collection: &str) -> RepoResult<Vec<Mutation>> {
        let mut mutations = self.pending().await?;
        mutations.retain(|m| m.collection == collection);
        Ok(mutations)
    }

    /// Returns the ids targeted by queued deletes in one collection.
    ///
    /// Reads use this to keep locally deleted records from reappearing
    /// before the server has confirmed the deletion.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read or decoded.
    pub async fn queued_delete_ids(&self, collection: &str) -> RepoResult<HashSet<String>> {
        Ok(self
            .pending_for(collection)
            .await?
            .into_iter()
            .filter(|m| m.kind == MutationKind::Delete)
            .map(|m| m.record_id.as_str().to_string())
            .collect())
    }

    /// Removes a confirmed mutation. Removing an already-absent sequence
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    pub async fn remove(&self, seq: u64) -> RepoResult<()> {
        self.store.delete(QUEUE_COLLECTION, &Self::key(seq)).await?;
        Ok(())
    }

    /// Durably increments a mutation's retry count and returns the new
    /// value. Returns 0 if the mutation is no longer queued.
    ///
    /// # Errors
    ///
    /// Returns an error if the updated count cannot be persisted.
    pub async fn record_attempt(&self, seq: u64) -> RepoResult<u32> {
        let key = Self::key(seq);
        let Some(doc) = self.store.get_by_id(QUEUE_COLLECTION, &key).await? else {
            return Ok(0);
        };
        let mut mutation: Mutation = serde_json::from_value(doc)?;
        mutation.retry_count += 1;
        self.store
            .put(QUEUE_COLLECTION, &key, serde_json::to_value(&mutation)?)
            .await?;
        Ok(mutation.retry_count)
    }

    /// Rewrites every pending mutation for `from` to target `to` instead.
    ///
    /// Called after a queued create is confirmed: later updates queued
    /// against the temporary id must replay against the server id. The
    /// payload's `id` field is rewritten along with the mutation's own
    /// record id. Returns how many mutations were rewritten.
    ///
    /// # Errors
    ///
    /// Returns an error if a rewritten mutation cannot be persisted.
    pub async fn rekey(
        &self,
        collection: &str,
        from: &RecordId,
        to: &RecordId,
    ) -> RepoResult<usize> {
        let mut rewritten = 0;
        for mut mutation in self.pending_for(collection).await? {
            if &mutation.record_id != from {
                continue;
            }
            mutation.record_id = to.clone();
            if let Some(map) = mutation.payload.as_object_mut() {
                if map.contains_key("id") {
                    map.insert("id".into(), Value::String(to.as_str().to_string()));
                }
            }
            self.store
                .put(
                    QUEUE_COLLECTION,
                    &Self::key(mutation.seq),
                    serde_json::to_value(&mutation)?,
                )
                .await?;
            rewritten += 1;
        }
        if rewritten > 0 {
            tracing::debug!(collection, from = %from, to = %to, rewritten, "rekeyed queued mutations");
        }
        Ok(rewritten)
    }

    /// Discards every pending mutation targeting one record.
    ///
    /// Used when a never-confirmed record is deleted locally: its queued
    /// create and updates must not replay, or the record would resurrect
    /// on reconnect. Returns how many mutations were discarded.
    ///
    /// # Errors
    ///
    /// Returns an error if a removal cannot be persisted.
    pub async fn discard_record(&self, collection: &str, record_id: &RecordId) -> RepoResult<usize> {
        let mut discarded = 0;
        for mutation in self.pending_for(collection).await? {
            if &mutation.record_id == record_id {
                self.remove(mutation.seq).await?;
                discarded += 1;
            }
        }
        Ok(discarded)
    }

    /// Number of pending mutations across all collections.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read.
    pub async fn len(&self) -> RepoResult<usize> {
        Ok(self.store.get_all(QUEUE_COLLECTION).await?.len())
    }

    /// True if no mutations are pending.
    ///
    /// # Errors
    ///
    /// Returns an error if the persisted queue cannot be read.
    pub async fn is_empty(&self) -> RepoResult<bool> {
        Ok(self.len().await? == 0)
    }
}
