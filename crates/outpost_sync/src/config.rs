//! Configuration for the monitor and coordinator.

use std::time::Duration;

/// Configuration for the network monitor.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Well-known endpoint probed for internet reachability.
    pub probe_url: String,
    /// Budget for the internet probe before it counts as unreachable.
    pub internet_timeout: Duration,
    /// Budget for the backend health check before it counts as unhealthy.
    pub health_timeout: Duration,
    /// Backend-relative health endpoint.
    pub health_path: String,
    /// Delay before the single retry after a network-change error.
    pub change_retry_delay: Duration,
}

impl MonitorConfig {
    /// Creates the default monitor configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe_url: "https://www.gstatic.com/generate_204".to_string(),
            internet_timeout: Duration::from_secs(2),
            health_timeout: Duration::from_secs(3),
            health_path: "/health".to_string(),
            change_retry_delay: Duration::from_millis(400),
        }
    }

    /// Sets the internet probe URL.
    #[must_use]
    pub fn with_probe_url(mut self, url: impl Into<String>) -> Self {
        self.probe_url = url.into();
        self
    }

    /// Sets the internet probe timeout.
    #[must_use]
    pub fn with_internet_timeout(mut self, timeout: Duration) -> Self {
        self.internet_timeout = timeout;
        self
    }

    /// Sets the backend health-check timeout.
    #[must_use]
    pub fn with_health_timeout(mut self, timeout: Duration) -> Self {
        self.health_timeout = timeout;
        self
    }

    /// Sets the backend health endpoint.
    #[must_use]
    pub fn with_health_path(mut self, path: impl Into<String>) -> Self {
        self.health_path = path.into();
        self
    }

    /// Sets the network-change retry delay.
    #[must_use]
    pub fn with_change_retry_delay(mut self, delay: Duration) -> Self {
        self.change_retry_delay = delay;
        self
    }
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration for the sync coordinator.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Replay attempts a mutation gets before it is dropped and reported
    /// as a permanent failure. Attempt counts are durable, so the budget
    /// spans passes and restarts.
    pub retry_budget: u32,
    /// Delay before the single retry after a network-change error.
    pub change_retry_delay: Duration,
}

impl SyncConfig {
    /// Creates the default sync configuration.
    #[must_use]
    pub fn new() -> Self {
        Self {
            retry_budget: 3,
            change_retry_delay: Duration::from_millis(400),
        }
    }

    /// Sets the retry budget.
    #[must_use]
    pub fn with_retry_budget(mut self, budget: u32) -> Self {
        self.retry_budget = budget.max(1);
        self
    }

    /// Sets the network-change retry delay.
    #[must_use]
    pub fn with_change_retry_delay(mut self, delay: Duration) -> Self {
        self.change_retry_delay = delay;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn monitor_defaults() {
        let config = MonitorConfig::new();
        assert_eq!(config.internet_timeout, Duration::from_secs(2));
        assert_eq!(config.health_timeout, Duration::from_secs(3));
        assert_eq!(config.health_path, "/health");
    }

    #[test]
    fn monitor_builder() {
        let config = MonitorConfig::new()
            .with_probe_url("https://probe.internal/ping")
            .with_health_path("/api/health")
            .with_internet_timeout(Duration::from_millis(500));
        assert_eq!(config.probe_url, "https://probe.internal/ping");
        assert_eq!(config.health_path, "/api/health");
        assert_eq!(config.internet_timeout, Duration::from_millis(500));
    }

    #[test]
    fn sync_retry_budget_is_at_least_one() {
        assert_eq!(SyncConfig::new().retry_budget, 3);
        assert_eq!(SyncConfig::new().with_retry_budget(0).retry_budget, 1);
    }
}
