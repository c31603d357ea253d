//! Thread-safe tracker handle
//!
//! When several threads of control can reach the tracker (for example a
//! renderer and a driver), every ingest must update the log and the counts
//! as one step. [`SharedTracker`] wraps the tracker in a single mutex so each
//! call is one critical section.

use crate::tracker::{EventTracker, Snapshot};
use crate::types::{Category, Event, Result, Timestamp};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Cloneable handle to one session's tracker
#[derive(Debug, Clone)]
pub struct SharedTracker {
    inner: Arc<Mutex<EventTracker>>,
}

impl SharedTracker {
    pub fn new(tracker: EventTracker) -> Self {
        Self {
            inner: Arc::new(Mutex::new(tracker)),
        }
    }

    // Ingest never leaves the tracker half-updated, so a poisoned lock still
    // guards consistent state.
    fn lock(&self) -> MutexGuard<'_, EventTracker> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// See [`EventTracker::ingest`]
    pub fn ingest(
        &self,
        category: Category,
        confidence: f64,
        threshold: f64,
        now: Timestamp,
    ) -> Event {
        self.lock().ingest(category, confidence, threshold, now)
    }

    /// Ingest and snapshot under one lock, so the snapshot's newest entry is
    /// the returned event even when other handles ingest concurrently
    pub fn ingest_and_snapshot(
        &self,
        category: Category,
        confidence: f64,
        threshold: f64,
        now: Timestamp,
    ) -> (Event, Snapshot) {
        let mut tracker = self.lock();
        let event = tracker.ingest(category, confidence, threshold, now);
        (event, tracker.snapshot())
    }

    /// See [`EventTracker::ingest_label`]
    pub fn ingest_label(
        &self,
        label: &str,
        confidence: f64,
        threshold: f64,
        now: Timestamp,
    ) -> Result<Event> {
        self.lock().ingest_label(label, confidence, threshold, now)
    }

    /// See [`EventTracker::snapshot`]
    pub fn snapshot(&self) -> Snapshot {
        self.lock().snapshot()
    }

    /// Run a read-only closure against the tracker while holding the lock
    pub fn with<T>(&self, f: impl FnOnce(&EventTracker) -> T) -> T {
        f(&self.lock())
    }
}

impl From<EventTracker> for SharedTracker {
    fn from(tracker: EventTracker) -> Self {
        Self::new(tracker)
    }
}
