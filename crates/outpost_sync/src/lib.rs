//! # Outpost Sync
//!
//! Network monitor and mutation-replay coordinator for Outpost.
//!
//! This crate provides:
//! - [`NetworkMonitor`] - a three-tier, debounced answer to "can we reach
//!   the backend right now", with change-only notifications
//! - [`SyncCoordinator`] - replays the durable mutation queue against the
//!   backend once connectivity returns, FIFO per collection, and reports
//!   per-pass outcomes
//!
//! ## Architecture
//!
//! Connectivity is decided in three tiers, checked in strict order with
//! short-circuiting: a device-level interface flag, a short internet
//! probe, and a backend health check. The monitor publishes one combined
//! verdict; repositories consult it through the `Connectivity` seam and
//! the coordinator watches it to trigger replay on reconnect.
//!
//! ## Key Invariants
//!
//! - At most one probe cycle runs at a time
//! - Listeners fire once per actual status transition, never on a no-op
//!   re-check
//! - Replay within one collection is strictly FIFO; a later mutation for
//!   a record never overtakes an earlier one
//! - Queue removal is idempotent, so overlapping sync passes are safe

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod coordinator;
mod monitor;
mod subscription;

pub use config::{MonitorConfig, SyncConfig};
pub use coordinator::{SyncCoordinator, SyncReport};
pub use monitor::{NetworkMonitor, NetworkStatus};
pub use subscription::Subscription;
