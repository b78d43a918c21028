//! A mock transport for testing.

use crate::api::{ApiResponse, Method, Transport};
use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};

/// A request observed by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Request method.
    pub method: Method,
    /// Backend-relative path.
    pub path: String,
    /// JSON body, if the request carried one.
    pub body: Option<Value>,
}

/// A scripted transport for testing.
///
/// Responses are enqueued per `(method, path)` route and consumed FIFO, so
/// a test can script "first call fails, second succeeds". An optional
/// blanket failure simulates a full outage for any route without a script.
/// Every request is recorded for assertions.
#[derive(Debug, Default)]
pub struct MockTransport {
    routes: Mutex<HashMap<(Method, String), VecDeque<TransportResult<ApiResponse>>>>,
    outage: Mutex<Option<TransportError>>,
    log: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    /// Creates a new mock transport with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues a scripted result for the given route.
    pub fn enqueue(&self, method: Method, path: &str, result: TransportResult<ApiResponse>) {
        self.routes
            .lock()
            .entry((method, path.to_string()))
            .or_default()
            .push_back(result);
    }

    /// Enqueues a `200 OK` response carrying `data`.
    pub fn enqueue_ok(&self, method: Method, path: &str, data: Value) {
        self.enqueue(method, path, Ok(ApiResponse::ok(data)));
    }

    /// Enqueues an error for the given route.
    pub fn enqueue_err(&self, method: Method, path: &str, error: TransportError) {
        self.enqueue(method, path, Err(error));
    }

    /// Makes every unscripted request fail with a clone of `error`.
    ///
    /// Scripted responses still take precedence, so a test can bring one
    /// route back while the rest of the backend stays dark.
    pub fn set_outage(&self, error: TransportError) {
        *self.outage.lock() = Some(error);
    }

    /// Clears the blanket failure set by [`MockTransport::set_outage`].
    pub fn clear_outage(&self) {
        *self.outage.lock() = None;
    }

    /// Returns every request observed so far.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.lock().clone()
    }

    /// Returns how many requests hit the given route.
    #[must_use]
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.log
            .lock()
            .iter()
            .filter(|req| req.method == method && req.path == path)
            .count()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> TransportResult<ApiResponse> {
        self.log.lock().push(RecordedRequest {
            method,
            path: path.to_string(),
            body,
        });

        let scripted = self
            .routes
            .lock()
            .get_mut(&(method, path.to_string()))
            .and_then(|queue| queue.pop_front());

        if let Some(result) = scripted {
            return result;
        }

        if let Some(error) = self.outage.lock().clone() {
            return Err(error);
        }

        Err(TransportError::invalid_response(format!(
            "no scripted response for {method} {path}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn mock_scripted_responses_consume_fifo() {
        let transport = MockTransport::new();
        transport.enqueue_err(Method::Get, "/vehicles", TransportError::Timeout);
        transport.enqueue_ok(Method::Get, "/vehicles", json!([1, 2]));

        assert!(matches!(
            transport.get("/vehicles").await,
            Err(TransportError::Timeout)
        ));
        let response = transport.get("/vehicles").await.unwrap();
        assert_eq!(response.data, json!([1, 2]));
    }

    #[tokio::test]
    async fn mock_outage_covers_unscripted_routes() {
        let transport = MockTransport::new();
        transport.set_outage(TransportError::connection("refused"));
        transport.enqueue_ok(Method::Get, "/health", json!({}));

        assert!(transport.get("/health").await.is_ok());
        assert!(matches!(
            transport.get("/vehicles").await,
            Err(TransportError::Connection { .. })
        ));

        transport.clear_outage();
        assert!(matches!(
            transport.get("/vehicles").await,
            Err(TransportError::InvalidResponse { .. })
        ));
    }

    #[tokio::test]
    async fn mock_records_requests() {
        let transport = MockTransport::new();
        transport.enqueue_ok(Method::Post, "/vehicles", json!({}));
        transport
            .post("/vehicles", json!({"plate": "AB-12"}))
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Post);
        assert_eq!(requests[0].body.as_ref().unwrap()["plate"], "AB-12");
        assert_eq!(transport.request_count(Method::Post, "/vehicles"), 1);
    }
}
