//! Internet-reachability probe seam.

use crate::error::{TransportError, TransportResult};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// A lightweight reachability check against an arbitrary URL.
///
/// This is the seam for the network monitor's internet tier: a bare GET to
/// a well-known endpoint, separate from [`crate::Transport`] because it
/// targets absolute URLs outside the backend API. Implementations should
/// not follow redirects or send credentials; the only question is whether
/// the wider internet answers at all.
#[async_trait]
pub trait ReachabilityProbe: Send + Sync {
    /// Issues a GET against `url` and returns the response status code.
    ///
    /// The caller owns the timeout budget; implementations should let the
    /// request run until the caller cancels it.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if the request fails before a status
    /// line is received.
    async fn check(&self, url: &str) -> TransportResult<u16>;
}

/// A scripted probe for testing.
///
/// Pops scripted results FIFO; once the script is exhausted it returns the
/// configured default (initially `Ok(204)`, the classic captive-portal
/// check response). An optional artificial delay makes timeout paths
/// testable.
#[derive(Debug)]
pub struct MockProbe {
    script: Mutex<VecDeque<TransportResult<u16>>>,
    default: Mutex<TransportResult<u16>>,
    delay: Mutex<Option<Duration>>,
}

impl MockProbe {
    /// Creates a probe that always reports reachable.
    #[must_use]
    pub fn reachable() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            default: Mutex::new(Ok(204)),
            delay: Mutex::new(None),
        }
    }

    /// Creates a probe that always fails with `error`.
    #[must_use]
    pub fn unreachable(error: TransportError) -> Self {
        let probe = Self::reachable();
        probe.set_default(Err(error));
        probe
    }

    /// Enqueues one scripted result.
    pub fn enqueue(&self, result: TransportResult<u16>) {
        self.script.lock().push_back(result);
    }

    /// Sets the result returned once the script is exhausted.
    pub fn set_default(&self, result: TransportResult<u16>) {
        *self.default.lock() = result;
    }

    /// Delays every check by `delay`, for exercising timeout handling.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock() = Some(delay);
    }
}

impl Default for MockProbe {
    fn default() -> Self {
        Self::reachable()
    }
}

#[async_trait]
impl ReachabilityProbe for MockProbe {
    async fn check(&self, _url: &str) -> TransportResult<u16> {
        let delay = *self.delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().pop_front();
        match scripted {
            Some(result) => result,
            None => self.default.lock().clone(),
        }
    }
}
