//! # Outpost Transport
//!
//! Transport contract and typed error taxonomy for Outpost.
//!
//! This crate defines the seam between Outpost and whatever HTTP client an
//! application embeds. The repository and sync layers never see raw HTTP -
//! they see the [`Transport`] trait, [`ApiResponse`] payloads, and the
//! closed [`TransportError`] taxonomy. Downstream logic switches on
//! [`TransportErrorKind`], never on error-message text.
//!
//! ## Contents
//!
//! - [`Transport`] - HTTP-verb request/response against backend paths
//! - [`TransportError`] / [`TransportErrorKind`] - closed error taxonomy
//! - [`ReachabilityProbe`] - the internet-reachability probe seam
//! - [`MockTransport`] / [`MockProbe`] - scripted test doubles

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod error;
mod mock;
mod probe;

pub use api::{ApiResponse, Method, Transport};
pub use error::{TransportError, TransportErrorKind, TransportResult};
pub use mock::{MockTransport, RecordedRequest};
pub use probe::{MockProbe, ReachabilityProbe};
