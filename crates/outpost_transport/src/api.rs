//! Transport trait and request/response shapes.

use crate::error::TransportResult;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

/// HTTP-like request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Read a resource or list.
    Get,
    /// Create a resource.
    Post,
    /// Replace or update a resource.
    Put,
    /// Remove a resource.
    Delete,
}

impl Method {
    /// Returns the canonical uppercase name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A successful response from the backend.
///
/// The `data` value is whatever the server put under its response envelope;
/// repository configuration owns unwrapping it into records.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    /// HTTP-like status code (always a success code; failures are errors).
    pub status: u16,
    /// Response payload.
    pub data: Value,
}

impl ApiResponse {
    /// Creates a `200 OK` response carrying `data`.
    #[must_use]
    pub fn ok(data: Value) -> Self {
        Self { status: 200, data }
    }

    /// Creates a response with an explicit status code.
    #[must_use]
    pub fn with_status(status: u16, data: Value) -> Self {
        Self { status, data }
    }
}

/// A transport handles request/response communication with the backend API.
///
/// This trait abstracts the HTTP client, allowing different implementations
/// (reqwest, hyper, a platform webview bridge, or a mock for testing).
/// Paths are backend-relative (`/vehicles`, `/vehicles/{id}`); the
/// implementation owns base URLs, headers, and session credentials.
///
/// # Invariants
///
/// - A 401-class response surfaces as [`TransportError::Unauthorized`],
///   never as an `ApiResponse`
/// - Other non-success statuses surface as [`TransportError::Status`]
/// - Implementations must be `Send + Sync`
///
/// [`TransportError::Unauthorized`]: crate::TransportError::Unauthorized
/// [`TransportError::Status`]: crate::TransportError::Status
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and returns the decoded response.
    ///
    /// # Errors
    ///
    /// Returns a [`crate::TransportError`] describing how the request
    /// failed.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> TransportResult<ApiResponse>;

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`Transport::request`].
    async fn get(&self, path: &str) -> TransportResult<ApiResponse> {
        self.request(Method::Get, path, None).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Transport::request`].
    async fn post(&self, path: &str, body: Value) -> TransportResult<ApiResponse> {
        self.request(Method::Post, path, Some(body)).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`Transport::request`].
    async fn put(&self, path: &str, body: Value) -> TransportResult<ApiResponse> {
        self.request(Method::Put, path, Some(body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`Transport::request`].
    async fn delete(&self, path: &str) -> TransportResult<ApiResponse> {
        self.request(Method::Delete, path, None).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_names() {
        assert_eq!(Method::Get.as_str(), "GET");
        assert_eq!(Method::Delete.to_string(), "DELETE");
    }

    #[test]
    fn response_ok_is_200() {
        let response = ApiResponse::ok(json!({"x": 1}));
        assert_eq!(response.status, 200);
        assert_eq!(response.data["x"], 1);
    }
}
