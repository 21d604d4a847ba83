//! Reload event delivery
//!
//! Listeners are notified once per successful reload cycle, strictly after
//! the new snapshot has been published. The registry copies the listener
//! list under a short read lock before iterating, so add/remove during
//! notification never races the delivery pass.

use crate::snapshot::PropertySnapshot;
use crate::sync::RwLockExt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use time::OffsetDateTime;

/// Delivered to every registered listener after a snapshot swap.
#[derive(Clone)]
pub struct ReloadEvent {
    /// The snapshot that was current before the swap
    pub old: Arc<PropertySnapshot>,
    /// The snapshot that is current after the swap
    pub new: Arc<PropertySnapshot>,
    /// When the swap was published
    pub at: OffsetDateTime,
}

/// Type alias for a reload callback
pub type ReloadCallback = Arc<dyn Fn(&ReloadEvent) + Send + Sync>;

/// Handle identifying a registered listener, used for removal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Thread-safe registry of reload listeners with copy-on-iterate delivery.
pub(crate) struct ListenerRegistry {
    listeners: RwLock<Vec<(ListenerId, ReloadCallback)>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Register a listener and return its removal handle
    pub(crate) fn add<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&ReloadEvent) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::SeqCst));
        self.listeners
            .write_recovered()
            .push((id, Arc::new(listener)));
        id
    }

    /// Remove a listener; returns false if the id was not registered
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut guard = self.listeners.write_recovered();
        let before = guard.len();
        guard.retain(|(listener_id, _)| *listener_id != id);
        guard.len() != before
    }

    /// Number of registered listeners
    pub(crate) fn len(&self) -> usize {
        self.listeners.read_recovered().len()
    }

    /// Deliver an event to every listener registered at the time of the call.
    ///
    /// A panicking listener is caught and logged; delivery continues to the
    /// remaining listeners and the published swap is never reverted.
    pub(crate) fn notify(&self, event: &ReloadEvent) {
        let snapshot: Vec<(ListenerId, ReloadCallback)> = self.listeners.read_recovered().clone();

        for (id, callback) in snapshot {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                log::warn!(
                    "reload listener {id:?} panicked for snapshot version {}; continuing delivery",
                    event.new.version()
                );
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::AtomicUsize;

    fn event(old_version: u64, new_version: u64) -> ReloadEvent {
        ReloadEvent {
            old: Arc::new(PropertySnapshot::new(HashMap::new(), old_version)),
            new: Arc::new(PropertySnapshot::new(HashMap::new(), new_version)),
            at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn test_notify_reaches_all_listeners() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let counter = counter.clone();
            registry.add(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        registry.notify(&event(1, 2));
        assert_eq!(counter.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_removed_listener_not_notified() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        let counter_clone = counter.clone();
        let id = registry.add(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify(&event(1, 2));
        assert!(registry.remove(id));
        registry.notify(&event(2, 3));

        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!registry.remove(id)); // already gone
    }

    #[test]
    fn test_panicking_listener_is_isolated() {
        let registry = ListenerRegistry::new();
        let counter = Arc::new(AtomicUsize::new(0));

        registry.add(|_| panic!("listener bug"));
        let counter_clone = counter.clone();
        registry.add(move |_| {
            counter_clone.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify(&event(1, 2));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_event_carries_snapshot_versions() {
        let registry = ListenerRegistry::new();
        let seen = Arc::new(RwLock::new(Vec::new()));

        let seen_clone = seen.clone();
        registry.add(move |e| {
            if let Ok(mut guard) = seen_clone.write() {
                guard.push((e.old.version(), e.new.version()));
            }
        });

        registry.notify(&event(4, 5));
        assert_eq!(*seen.read().unwrap(), vec![(4, 5)]);
    }
}
