//! # Outpost Core
//!
//! Entity model, durable mutation queue, and the generic offline-first
//! repository for Outpost.
//!
//! This crate provides:
//! - Record identity with explicit server/temporary discrimination
//! - The [`Entity`] contract every synced record type implements
//! - Per-collection [`RepositoryConfig`] including response unwrapping
//! - A durable FIFO [`MutationQueue`] of unconfirmed writes
//! - [`EntityRepository`], one uniform CRUD contract per collection
//!
//! ## Read and write strategy
//!
//! Reads are **network-first**: prefer the server, reconcile against
//! locally queued deletes, refresh the cache in the background, and fall
//! back to the cache when the server is unreachable. Writes are
//! **offline-first**: a write that cannot be confirmed by the server is
//! committed locally at once, queued, and replayed later by the sync
//! layer. Only validation and authorization failures ever surface from a
//! write; transient network failures degrade silently to the offline path.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod connectivity;
pub mod entity;
mod error;
mod queue;
mod repository;

pub use config::RepositoryConfig;
pub use connectivity::{Connectivity, StaticConnectivity};
pub use entity::id::{RecordId, TEMP_ID_PREFIX};
pub use entity::Entity;
pub use error::{RepoError, RepoResult};
pub use queue::{Mutation, MutationKind, MutationQueue, QUEUE_COLLECTION};
pub use repository::EntityRepository;
