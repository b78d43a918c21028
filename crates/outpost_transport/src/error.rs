//! Error types for the transport layer.

use thiserror::Error;

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Errors that can occur during transport operations.
///
/// This is a closed taxonomy: callers branch on the variant (or on
/// [`TransportError::kind`]), never on message text. Implementations of
/// [`crate::Transport`] are responsible for mapping their HTTP client's
/// failures into these variants at the boundary.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// The server rejected the caller's session (HTTP 401 class).
    ///
    /// Never retried and never absorbed into offline fallback.
    #[error("unauthorized: session is missing or expired")]
    Unauthorized,

    /// The underlying network route changed mid-request.
    ///
    /// Typical during Wi-Fi to cellular handoff. Callers retry exactly once
    /// after a short delay before treating it as a real failure.
    #[error("network route changed during request")]
    NetworkChanged,

    /// The request did not complete within its timeout budget.
    #[error("request timed out")]
    Timeout,

    /// The request never reached the server (DNS, TCP, TLS failure).
    #[error("connection failed: {message}")]
    Connection {
        /// Description of the failure.
        message: String,
    },

    /// The server answered with a non-success status other than 401.
    #[error("server returned status {code}: {message}")]
    Status {
        /// HTTP-like status code.
        code: u16,
        /// Server-provided message, if any.
        message: String,
    },

    /// The response body could not be decoded.
    #[error("invalid response: {message}")]
    InvalidResponse {
        /// Description of the decode failure.
        message: String,
    },
}

/// Coarse classification used by retry and fallback logic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// Authentication problem; surfaced to the caller immediately.
    Unauthorized,
    /// Transient route change; retried once before counting as failure.
    NetworkChanged,
    /// Everything else.
    Other,
}

impl TransportError {
    /// Creates a connection error.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Creates a status error.
    pub fn status(code: u16, message: impl Into<String>) -> Self {
        Self::Status {
            code,
            message: message.into(),
        }
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns the coarse classification of this error.
    #[must_use]
    pub fn kind(&self) -> TransportErrorKind {
        match self {
            TransportError::Unauthorized => TransportErrorKind::Unauthorized,
            TransportError::NetworkChanged => TransportErrorKind::NetworkChanged,
            _ => TransportErrorKind::Other,
        }
    }

    /// Returns true if the failure may clear on its own and a later
    /// attempt could succeed.
    ///
    /// Authorization failures and undecodable responses are not transient;
    /// retrying them without outside intervention cannot help.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::NetworkChanged
            | TransportError::Timeout
            | TransportError::Connection { .. } => true,
            TransportError::Status { code, .. } => *code >= 500,
            TransportError::Unauthorized | TransportError::InvalidResponse { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_classification() {
        assert_eq!(
            TransportError::Unauthorized.kind(),
            TransportErrorKind::Unauthorized
        );
        assert_eq!(
            TransportError::NetworkChanged.kind(),
            TransportErrorKind::NetworkChanged
        );
        assert_eq!(TransportError::Timeout.kind(), TransportErrorKind::Other);
        assert_eq!(
            TransportError::status(503, "unavailable").kind(),
            TransportErrorKind::Other
        );
    }

    #[test]
    fn transient_classification() {
        assert!(TransportError::NetworkChanged.is_transient());
        assert!(TransportError::Timeout.is_transient());
        assert!(TransportError::connection("refused").is_transient());
        assert!(TransportError::status(500, "oops").is_transient());

        assert!(!TransportError::Unauthorized.is_transient());
        assert!(!TransportError::status(422, "bad payload").is_transient());
        assert!(!TransportError::invalid_response("not json").is_transient());
    }
}
