//! Reload cycle and polling coordinator
//!
//! A reload cycle is Loading (build a candidate snapshot off the read
//! path), then Publishing (swap the current-snapshot reference and notify
//! listeners). A failed load publishes nothing: the previous snapshot stays
//! authoritative and readers keep serving stale-but-valid data.

use crate::error::{Error, Result};
use crate::events::ReloadEvent;
use crate::snapshot::PropertySnapshot;
use crate::sync::{MutexExt, RwLockExt};

use log::{debug, warn};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use time::OffsetDateTime;

use super::ConfigSurface;

impl ConfigSurface {
    /// Run one reload cycle synchronously: load a candidate snapshot,
    /// publish it, notify listeners.
    ///
    /// Cycles are serialized: a manual reload and the polling coordinator
    /// never interleave. Every successful cycle publishes and notifies,
    /// even when the candidate is content-identical to the current
    /// snapshot — the version still increments.
    ///
    /// # Errors
    ///
    /// Returns the load failure; nothing is published and the previous
    /// snapshot remains current.
    pub fn reload(&self) -> Result<Arc<PropertySnapshot>> {
        let _cycle = self.cycle_lock.lock_recovered();

        let candidate = self.load_candidate()?;
        let new = Arc::new(candidate);

        // Publishing: the swap is the only write to the snapshot pointer
        // and the only moment readers can observe a version change.
        let old = {
            let mut guard = self.current.write_recovered();
            std::mem::replace(&mut *guard, Arc::clone(&new))
        };

        debug!(
            "published snapshot version {} ({} properties, was version {})",
            new.version(),
            new.len(),
            old.version()
        );

        let event = ReloadEvent {
            old,
            new: Arc::clone(&new),
            at: OffsetDateTime::now_utc(),
        };
        self.listeners.notify(&event);

        Ok(new)
    }

    /// Build a candidate snapshot, bounded by the configured fetch timeout.
    ///
    /// With a timeout, the load runs on a scratch thread; expiry abandons
    /// the worker (its result is discarded) and counts as a load failure.
    fn load_candidate(&self) -> Result<PropertySnapshot> {
        let Some(timeout) = self.fetch_timeout else {
            return self.loader.load();
        };

        let (tx, rx) = mpsc::channel();
        let loader = Arc::clone(&self.loader);
        std::thread::Builder::new()
            .name("propbind-load".into())
            .spawn(move || {
                let _ = tx.send(loader.load());
            })
            .map_err(Error::Worker)?;

        match rx.recv_timeout(timeout) {
            Ok(result) => result,
            Err(_) => Err(Error::LoadTimeout { waited: timeout }),
        }
    }

    /// Start a polling coordinator that runs a reload cycle every
    /// `interval` until stopped.
    ///
    /// Load failures are logged and swallowed; readers keep the last
    /// published snapshot. Dropping the returned [`ReloadCoordinator`]
    /// stops the schedule.
    ///
    /// # Errors
    ///
    /// Returns an error if the scheduler thread cannot be spawned.
    pub fn watch_polling(self: &Arc<Self>, interval: Duration) -> Result<ReloadCoordinator> {
        let surface = Arc::clone(self);
        let (stop_tx, stop_rx) = mpsc::channel();

        let handle = std::thread::Builder::new()
            .name("propbind-reload".into())
            .spawn(move || {
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if let Err(err) = surface.reload() {
                                warn!("scheduled reload failed, keeping previous snapshot: {err}");
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(Error::Worker)?;

        Ok(ReloadCoordinator {
            stop_tx,
            handle: Some(handle),
        })
    }
}

/// Handle to a running polling schedule.
///
/// Stopping (or dropping) the coordinator halts future scheduled cycles.
/// An in-flight cycle is allowed to finish and either publish or discard;
/// no new cycle starts afterwards.
pub struct ReloadCoordinator {
    stop_tx: mpsc::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl ReloadCoordinator {
    /// Stop the schedule and wait for the scheduler thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let _ = self.stop_tx.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ReloadCoordinator {
    fn drop(&mut self) {
        self.shutdown();
    }
}

// =============================================================================
// Tests
// =============================================================================
