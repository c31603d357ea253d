//! IoT IDS Event Tracker Library
//!
//! Session state for an intrusion-detection dashboard: a bounded, newest-first
//! log of detection events plus all-time per-category counts, fed one
//! detection per tick.
//!
//! # Architecture
//!
//! - [`EventTracker`] owns the windowed log and the counts, and decides each
//!   event's alert flag at ingestion time
//! - [`DetectionSource`] is the seam for where detections come from; the
//!   bundled [`SimulatedGenerator`] draws weighted random labels
//! - [`SharedTracker`] makes the tracker safe to reach from several threads
//! - [`Driver`] serializes timer ticks and manual refreshes into one stream
//!
//! The library does NOT:
//! - Inspect real packets or flows
//! - Run a trained classifier
//! - Persist anything across restarts
//! - Render the dashboard
//!
//! Rendering lives in the application layer (iot-ids-cli).
//!
//! # Example Usage
//!
//! ```
//! use chrono::Local;
//! use iot_ids_core::{EventTracker, GeneratorConfig, SimulatedGenerator, TrackerConfig};
//!
//! let config = TrackerConfig::new().with_capacity(10);
//! let mut tracker = EventTracker::from_config(&config).unwrap();
//! let mut generator = SimulatedGenerator::from_seed(&GeneratorConfig::new(), 42).unwrap();
//!
//! for _ in 0..25 {
//!     let detection = generator.generate();
//!     tracker.ingest_detection(detection, config.confidence_threshold, Local::now());
//! }
//!
//! let snapshot = tracker.snapshot();
//! assert_eq!(snapshot.entries.len(), 10);
//! assert_eq!(snapshot.total_processed, 25);
//! ```

// Public modules
pub mod config;
pub mod driver;
pub mod generator;
pub mod shared;
pub mod tracker;
pub mod types;

// Re-export main types for convenience
pub use config::{GeneratorConfig, TrackerConfig};
pub use driver::{Command, Driver, DriverStats, Tick, Trigger};
pub use generator::{DetectionSource, SimulatedGenerator};
pub use shared::SharedTracker;
pub use tracker::{EventTracker, Snapshot};
pub use types::{Category, Detection, Event, Result, Timestamp, TrackerError};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
