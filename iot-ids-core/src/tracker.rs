//! Bounded event log and aggregate statistics
//!
//! The tracker keeps two views of the same detection stream:
//! - a newest-first log holding only the most recent `capacity` events
//! - per-category counts accumulated over the whole session
//!
//! Counts are never decremented when the log evicts, so
//! `total_processed >= entries.len()` always holds.

use crate::config::TrackerConfig;
use crate::types::{Category, Detection, Event, Result, Timestamp, TrackerError};
use chrono::Timelike;
use serde::Serialize;
use std::collections::{BTreeMap, VecDeque};

/// Session-scoped event log with all-time category counts
#[derive(Debug, Clone)]
pub struct EventTracker {
    /// Newest event at the front
    log: VecDeque<Event>,
    /// Indexed by `Category::index`
    counts: [u64; 5],
    capacity: usize,
}

impl EventTracker {
    /// Create an empty tracker keeping at most `capacity` events
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TrackerError::InvalidConfiguration(
                "log_capacity must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            log: VecDeque::with_capacity(capacity),
            counts: [0; 5],
            capacity,
        })
    }

    /// Create a tracker from a full configuration (validated first)
    pub fn from_config(config: &TrackerConfig) -> Result<Self> {
        config.validate()?;
        Self::new(config.log_capacity)
    }

    /// Record one detection
    ///
    /// The alert flag is decided here, against `threshold`, and is never
    /// revisited. Once the log is full the oldest event is dropped.
    pub fn ingest(
        &mut self,
        category: Category,
        confidence: f64,
        threshold: f64,
        now: Timestamp,
    ) -> Event {
        let event = Event {
            timestamp: now.with_nanosecond(0).unwrap_or(now),
            category,
            confidence,
            is_alert: confidence >= threshold,
        };

        self.log.push_front(event.clone());
        if self.log.len() > self.capacity {
            if let Some(evicted) = self.log.pop_back() {
                log::debug!(
                    "Log full ({} events), evicted {} from {}",
                    self.capacity,
                    evicted.category,
                    evicted.time_label()
                );
            }
        }

        self.counts[category.index()] += 1;

        log::trace!(
            "Ingested {} (confidence {:.2}, threshold {:.2}, alert: {})",
            event.category,
            event.confidence,
            threshold,
            event.is_alert
        );

        event
    }

    /// Record a detection produced by a [`DetectionSource`](crate::DetectionSource)
    pub fn ingest_detection(&mut self, detection: Detection, threshold: f64, now: Timestamp) -> Event {
        self.ingest(detection.category, detection.confidence, threshold, now)
    }

    /// Record a detection given as a raw classifier label
    ///
    /// Unknown labels fail with [`TrackerError::InvalidCategory`] and leave the
    /// tracker untouched.
    pub fn ingest_label(
        &mut self,
        label: &str,
        confidence: f64,
        threshold: f64,
        now: Timestamp,
    ) -> Result<Event> {
        let category = label.parse::<Category>().map_err(|e| {
            log::warn!("Rejected detection with unknown label {:?}", label);
            e
        })?;
        Ok(self.ingest(category, confidence, threshold, now))
    }

    /// Read-only view of the current state
    pub fn snapshot(&self) -> Snapshot {
        let counts: BTreeMap<Category, u64> =
            Category::ALL.iter().map(|&c| (c, self.count(c))).collect();
        let total_processed = self.total_processed();
        let window_alerts = self.log.iter().filter(|e| e.is_alert).count();

        Snapshot {
            entries: self.log.iter().cloned().collect(),
            counts,
            total_processed,
            total_attacks: total_processed - self.count(Category::Normal),
            window_alerts,
            window_normal: self.log.len() - window_alerts,
        }
    }

    /// All-time number of events in `category`
    pub fn count(&self, category: Category) -> u64 {
        self.counts[category.index()]
    }

    /// All-time number of events
    pub fn total_processed(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Most recently ingested event
    pub fn latest(&self) -> Option<&Event> {
        self.log.front()
    }

    /// Events currently in the window, newest first
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.log.iter()
    }

    /// Number of events currently in the window
    pub fn len(&self) -> usize {
        self.log.len()
    }

    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Point-in-time copy of the tracker state, as consumed by the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    /// Windowed log, newest first
    pub entries: Vec<Event>,
    /// All-time counts, every category present
    pub counts: BTreeMap<Category, u64>,
    /// Sum of all counts
    pub total_processed: u64,
    /// All-time non-`Normal` events, independent of the alert threshold
    pub total_attacks: u64,
    /// Events in the window flagged as alerts
    pub window_alerts: usize,
    /// Events in the window not flagged as alerts
    pub window_normal: usize,
}

impl Snapshot {
    /// Count for one category
    pub fn count(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    /// Alert share of the window as a percentage (None when the window is empty)
    pub fn window_alert_percent(&self) -> Option<f64> {
        let window = self.window_alerts + self.window_normal;
        if window == 0 {
            None
        } else {
            Some(self.window_alerts as f64 * 100.0 / window as f64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    fn at(secs: u32) -> Timestamp {
        Local.with_ymd_and_hms(2024, 5, 1, 12, 0, secs).unwrap()
    }

    #[test]
    fn test_new_tracker_is_empty() {
        let tracker = EventTracker::new(100).unwrap();
        let snapshot = tracker.snapshot();

        assert!(tracker.is_empty());
        assert_eq!(snapshot.total_processed, 0);
        assert_eq!(snapshot.counts.len(), 5);
        assert!(snapshot.counts.values().all(|&c| c == 0));
        assert_eq!(snapshot.window_alert_percent(), None);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            EventTracker::new(0),
            Err(TrackerError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_eviction_keeps_newest() {
        let mut tracker = EventTracker::new(3).unwrap();
        let a = tracker.ingest(Category::Normal, 0.9, 0.9, at(1));
        let b = tracker.ingest(Category::DoS, 0.95, 0.9, at(2));
        let c = tracker.ingest(Category::Probe, 0.92, 0.9, at(3));
        let d = tracker.ingest(Category::Botnet, 0.99, 0.9, at(4));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.entries, vec![d.clone(), c, b]);
        assert!(!snapshot.entries.contains(&a));
        assert_eq!(tracker.latest(), Some(&d));

        for category in [Category::Normal, Category::DoS, Category::Probe, Category::Botnet] {
            assert_eq!(snapshot.count(category), 1);
        }
        assert_eq!(snapshot.count(Category::BruteForce), 0);
        assert!(a.is_alert && snapshot.entries.iter().all(|e| e.is_alert));
    }

    #[test]
    fn test_normal_below_threshold() {
        let mut tracker = EventTracker::new(10).unwrap();
        tracker.ingest(Category::DoS, 0.99, 0.95, at(1));
        let before = tracker.snapshot();

        let event = tracker.ingest(Category::Normal, 0.80, 0.95, at(2));
        let after = tracker.snapshot();

        assert!(!event.is_alert);
        assert_eq!(after.total_processed, before.total_processed + 1);
        assert_eq!(after.total_attacks, before.total_attacks);
        assert_eq!(after.window_alerts, 1);
        assert_eq!(after.window_normal, 1);
    }

    #[test]
    fn test_threshold_boundary_is_inclusive() {
        let mut tracker = EventTracker::new(10).unwrap();
        assert!(tracker.ingest(Category::Probe, 0.9, 0.9, at(1)).is_alert);
        assert!(!tracker.ingest(Category::Probe, 0.89, 0.9, at(2)).is_alert);
    }

    #[test]
    fn test_attacks_and_alerts_are_separate_metrics() {
        let mut tracker = EventTracker::new(10).unwrap();
        // High-confidence Normal: alert but not an attack
        tracker.ingest(Category::Normal, 0.99, 0.9, at(1));
        // Low-confidence DoS: attack but not an alert
        tracker.ingest(Category::DoS, 0.85, 0.9, at(2));

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.total_attacks, 1);
        assert_eq!(snapshot.window_alerts, 1);
        assert_eq!(snapshot.window_alert_percent(), Some(50.0));
    }

    #[test]
    fn test_unknown_label_leaves_state_untouched() {
        let mut tracker = EventTracker::new(10).unwrap();
        tracker.ingest(Category::Normal, 0.9, 0.9, at(1));
        let before = tracker.snapshot();

        let err = tracker.ingest_label("Ransomware", 0.99, 0.9, at(2)).unwrap_err();
        assert_eq!(err, TrackerError::InvalidCategory("Ransomware".to_string()));
        assert_eq!(tracker.snapshot(), before);

        let event = tracker.ingest_label("BruteForce", 0.99, 0.9, at(3)).unwrap();
        assert_eq!(event.category, Category::BruteForce);
    }

    #[test]
    fn test_timestamp_truncated_to_seconds() {
        let mut tracker = EventTracker::new(1).unwrap();
        let now = at(5).with_nanosecond(750_000_000).unwrap();

        let event = tracker.ingest(Category::Normal, 0.9, 0.9, now);
        assert_eq!(event.timestamp, at(5));
        assert_eq!(event.time_label(), "12:00:05");
    }

    #[test]
    fn test_from_config_validates() {
        let config = TrackerConfig::new().with_capacity(5);
        assert_eq!(EventTracker::from_config(&config).unwrap().capacity(), 5);

        let bad = TrackerConfig::new().with_threshold(2.0);
        assert!(EventTracker::from_config(&bad).is_err());
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let mut tracker = EventTracker::new(2).unwrap();
        tracker.ingest(Category::BruteForce, 0.97, 0.9, at(1));

        let json = serde_json::to_value(tracker.snapshot()).unwrap();
        assert_eq!(json["total_processed"], 1);
        assert_eq!(json["counts"]["BruteForce"], 1);
        assert_eq!(json["entries"][0]["category"], "BruteForce");
        assert_eq!(json["entries"][0]["is_alert"], true);
    }
}
