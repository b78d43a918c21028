//! # Outpost Store
//!
//! Local document store contract and reference backends for Outpost.
//!
//! This crate provides the lowest-level persistence abstraction in Outpost.
//! A store is a **collection-scoped document store**: it maps
//! `(collection, id)` pairs to JSON documents and does not interpret the
//! documents it holds.
//!
//! ## Design Principles
//!
//! - Stores are plain document stores (get, put, delete, bulk replace)
//! - No knowledge of entities, pending flags, or sync state
//! - Must be `Send + Sync` so one store can back every repository
//! - Outpost owns all document interpretation
//!
//! ## Available Backends
//!
//! - [`MemoryStore`] - For testing and ephemeral use
//! - [`JsonFileStore`] - One JSON file per collection on disk
//!
//! ## Example
//!
//! ```rust
//! use outpost_store::{LocalStore, MemoryStore};
//! use serde_json::json;
//!
//! # let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! # rt.block_on(async {
//! let store = MemoryStore::new();
//! store.put("vehicles", "v1", json!({"id": "v1"})).await.unwrap();
//! let doc = store.get_by_id("vehicles", "v1").await.unwrap();
//! assert!(doc.is_some());
//! # });
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod file;
mod memory;
mod store;

pub use error::{StoreError, StoreResult};
pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::LocalStore;
