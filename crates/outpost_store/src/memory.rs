//! In-memory store backend for testing.

use crate::error::StoreResult;
use crate::store::LocalStore;
use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

/// An in-memory document store.
///
/// This backend keeps all documents in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral caches that don't need persistence
///
/// Documents within a collection are held in a `BTreeMap`, so `get_all`
/// ordering by id key falls out of the map itself.
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across tasks.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Value>>>,
}

impl MemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of documents in `collection`.
    ///
    /// Useful for test assertions.
    #[must_use]
    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .read()
            .get(collection)
            .map(|docs| docs.len())
            .unwrap_or(0)
    }

    /// Returns `true` if `collection` holds no documents.
    #[must_use]
    pub fn is_empty(&self, collection: &str) -> bool {
        self.len(collection) == 0
    }

    /// Removes every document from every collection.
    pub fn clear(&self) {
        self.collections.write().clear();
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>> {
        let collections = self.collections.read();
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn put(&self, collection: &str, id: &str, document: Value) -> StoreResult<()> {
        let mut collections = self.collections.write();
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), document);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool> {
        let mut collections = self.collections.write();
        Ok(collections
            .get_mut(collection)
            .map(|docs| docs.remove(id).is_some())
            .unwrap_or(false))
    }

    async fn replace_all(
        &self,
        collection: &str,
        documents: Vec<(String, Value)>,
    ) -> StoreResult<()> {
        let mut collections = self.collections.write();
        collections.insert(collection.to_string(), documents.into_iter().collect());
        Ok(())
    }
}
