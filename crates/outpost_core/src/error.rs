//! Error types for repository operations.

use outpost_store::StoreError;
use outpost_transport::TransportError;
use thiserror::Error;

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;

/// Errors that can surface from repository operations.
///
/// The propagation policy is deliberately asymmetric: validation,
/// authorization, and local-store failures reach the caller, while
/// transient network failures during writes are absorbed by the offline
/// path and never become user-visible errors.
#[derive(Debug, Error)]
pub enum RepoError {
    /// The caller supplied invalid data. Thrown synchronously, never
    /// retried.
    #[error("validation failed: {message}")]
    Validation {
        /// Description of the offending field or shape.
        message: String,
    },

    /// An offline update or delete targeted a record absent from the
    /// local cache.
    #[error("record {id} not found in collection {collection}")]
    NotFound {
        /// Collection searched.
        collection: String,
        /// Id that was not found.
        id: String,
    },

    /// The backend rejected the caller's session.
    ///
    /// Propagated immediately; queueing the write for later replay cannot
    /// fix an authentication problem.
    #[error("unauthorized: session is missing or expired")]
    Unauthorized,

    /// A network failure other than an authorization rejection.
    #[error("network error: {0}")]
    Network(TransportError),

    /// The local store failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A record or queue entry could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RepoError {
    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Creates a not-found error.
    pub fn not_found(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Returns true if the offline path is allowed to absorb this failure.
    ///
    /// Only network failures degrade to the offline path; everything else
    /// is the caller's problem or a local fault that queueing cannot fix.
    #[must_use]
    pub fn is_offline_fallback(&self) -> bool {
        matches!(self, RepoError::Network(_))
    }
}

impl From<TransportError> for RepoError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Unauthorized => RepoError::Unauthorized,
            other => RepoError::Network(other),
        }
    }
}
