//! Listener registration shared by the monitor and the coordinator.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

/// Handle for a registered listener.
///
/// Dropping the subscription unsubscribes the listener; [`Subscription::cancel`]
/// does the same thing with a name.
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    pub(crate) fn new(cancel: impl FnOnce() + Send + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// Unsubscribes the listener now.
    pub fn cancel(mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

type Callbacks<E> = Mutex<HashMap<u64, Arc<dyn Fn(&E) + Send + Sync>>>;

/// Interior registry of listeners for one event type.
pub(crate) struct ListenerSet<E> {
    callbacks: Arc<Callbacks<E>>,
    next_id: AtomicU64,
}

impl<E: 'static> ListenerSet<E> {
    pub(crate) fn new() -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(HashMap::new())),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn subscribe(&self, callback: impl Fn(&E) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.callbacks.lock().insert(id, Arc::new(callback));

        let weak: Weak<Callbacks<E>> = Arc::downgrade(&self.callbacks);
        Subscription::new(move || {
            if let Some(callbacks) = weak.upgrade() {
                callbacks.lock().remove(&id);
            }
        })
    }

    /// Invokes every listener with `event`, outside the registry lock.
    pub(crate) fn emit(&self, event: &E) {
        let snapshot: Vec<_> = self.callbacks.lock().values().cloned().collect();
        for callback in snapshot {
            callback(event);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.callbacks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn drop_unsubscribes() {
        let listeners: ListenerSet<u32> = ListenerSet::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let subscription = {
            let hits = hits.clone();
            listeners.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        assert_eq!(listeners.len(), 1);

        listeners.emit(&1);
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        drop(subscription);
        assert_eq!(listeners.len(), 0);
        listeners.emit(&2);
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn cancel_is_explicit_drop() {
        let listeners: ListenerSet<u32> = ListenerSet::new();
        let subscription = listeners.subscribe(|_| {});
        subscription.cancel();
        assert_eq!(listeners.len(), 0);
    }
}
