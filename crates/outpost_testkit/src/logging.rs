//! Test logging configuration utilities.
//!
//! Configures tracing for tests to keep output clean by default and
//! enable debugging when needed.

use std::sync::Once;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

static INIT: Once = Once::new();

/// Initializes tracing for tests with the given default level.
///
/// The global subscriber can only be installed once per test process;
/// subsequent calls are ignored. `RUST_LOG` overrides `level` when set.
pub fn init_test_logging(level: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let subscriber = FmtSubscriber::builder()
            .with_env_filter(filter)
            .with_test_writer()
            .finish();

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// Suppresses all but error logs for clean test output.
pub fn suppress_logs() {
    init_test_logging("error");
}
