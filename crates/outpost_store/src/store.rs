//! Local store trait definition.

use crate::error::StoreResult;
use async_trait::async_trait;
use serde_json::Value;

/// A collection-scoped document store.
///
/// Stores are **opaque document stores**. They map `(collection, id)` pairs
/// to JSON documents and provide simple operations for reading, writing,
/// and bulk-replacing documents. Outpost owns all document interpretation -
/// stores do not understand entities, pending flags, or queue entries.
///
/// # Invariants
///
/// - `get_all` returns documents sorted by their id key
/// - `put` is an upsert: it creates or overwrites a single document
/// - `delete` is idempotent; deleting an absent document is not an error
/// - `replace_all` atomically swaps a collection's entire contents
/// - Stores must be `Send + Sync` so one instance can back every repository
///
/// # Implementors
///
/// - [`crate::MemoryStore`] - For testing and ephemeral use
/// - [`crate::JsonFileStore`] - For on-disk persistence
#[async_trait]
pub trait LocalStore: Send + Sync {
    /// Returns every document in `collection`, sorted by id key.
    ///
    /// An unknown collection yields an empty list, not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data cannot be read or decoded.
    async fn get_all(&self, collection: &str) -> StoreResult<Vec<Value>>;

    /// Returns the document stored under `id` in `collection`, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing data cannot be read or decoded.
    async fn get_by_id(&self, collection: &str, id: &str) -> StoreResult<Option<Value>>;

    /// Creates or overwrites the document stored under `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write cannot be persisted.
    async fn put(&self, collection: &str, id: &str, document: Value) -> StoreResult<()>;

    /// Removes the document stored under `id`.
    ///
    /// Returns `true` if a document was removed, `false` if none existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the removal cannot be persisted.
    async fn delete(&self, collection: &str, id: &str) -> StoreResult<bool>;

    /// Replaces the entire contents of `collection` with `documents`.
    ///
    /// Used to overwrite the local cache with fresh server data after a
    /// successful online fetch. Passing an empty list clears the collection.
    ///
    /// # Errors
    ///
    /// Returns an error if the replacement cannot be persisted.
    async fn replace_all(&self, collection: &str, documents: Vec<(String, Value)>)
        -> StoreResult<()>;
}
