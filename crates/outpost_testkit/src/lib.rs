//! # Outpost Testkit
//!
//! Test utilities for Outpost.
//!
//! This crate provides:
//! - Fixture entity types with realistic validation rules
//! - A fully wired harness (store + transport + probe + monitor + queue +
//!   coordinator + repositories) for integration tests
//! - Test logging configuration
//!
//! ## Usage
//!
//! ```rust,ignore
//! use outpost_testkit::prelude::*;
//!
//! #[tokio::test]
//! async fn offline_create_round_trip() {
//!     let harness = Harness::new().await;
//!     harness.go_offline().await;
//!     // ... drive the repositories
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod fixtures;
pub mod harness;
pub mod logging;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::fixtures::*;
    pub use crate::harness::*;
    pub use crate::logging::*;
}

pub use fixtures::*;
pub use harness::*;
pub use logging::*;
