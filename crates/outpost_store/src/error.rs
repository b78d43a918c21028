//! Error types for the store layer.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// I/O error from the underlying backend.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A document could not be serialized or deserialized.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A persisted collection file is not in the expected format.
    #[error("corrupt collection data at {path}: {message}")]
    Corrupt {
        /// Path of the offending file.
        path: String,
        /// Description of the problem.
        message: String,
    },
}

impl StoreError {
    /// Creates a corrupt-data error.
    pub fn corrupt(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Corrupt {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corrupt_display() {
        let err = StoreError::corrupt("/tmp/vehicles.json", "expected object");
        let text = err.to_string();
        assert!(text.contains("/tmp/vehicles.json"));
        assert!(text.contains("expected object"));
    }
}
