//! Connectivity seam between repositories and the network monitor.

use std::sync::atomic::{AtomicBool, Ordering};

/// The one question a repository asks before choosing a path: is the
/// backend reachable right now?
///
/// The production implementation is the network monitor in
/// `outpost_sync`; tests swap in [`StaticConnectivity`]. The answer is a
/// cached verdict, not a fresh probe - repositories must stay fast and
/// synchronous on this call.
pub trait Connectivity: Send + Sync {
    /// Returns the current debounced online verdict.
    fn is_online(&self) -> bool;
}

/// A fixed connectivity answer for tests and tooling.
#[derive(Debug)]
pub struct StaticConnectivity {
    online: AtomicBool,
}

impl StaticConnectivity {
    /// Creates a connectivity source that reports online.
    #[must_use]
    pub fn online() -> Self {
        Self {
            online: AtomicBool::new(true),
        }
    }

    /// Creates a connectivity source that reports offline.
    #[must_use]
    pub fn offline() -> Self {
        Self {
            online: AtomicBool::new(false),
        }
    }

    /// Flips the reported verdict.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
