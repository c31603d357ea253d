//! Core types for the IDS event tracker
//!
//! This module defines the traffic categories, the detections produced by a
//! detection source, and the events stored by the tracker. Events are
//! immutable once created - the alert flag is decided at ingestion time and
//! never recomputed.

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Timestamp type used throughout the tracker (local wall-clock time)
pub type Timestamp = DateTime<Local>;

/// Result type for tracker operations
pub type Result<T> = std::result::Result<T, TrackerError>;

/// Errors that can occur while configuring or feeding the tracker
///
/// Both variants signal a programming or configuration mistake. They are
/// surfaced immediately and never retried.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrackerError {
    #[error("Invalid category: {0:?}")]
    InvalidCategory(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Traffic classification label
///
/// The set is fixed: `Normal` plus four attack types. Declaration order is
/// the display order used by charts and count tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Category {
    Normal,
    DoS,
    Botnet,
    Probe,
    BruteForce,
}

impl Category {
    /// All categories, in display order
    pub const ALL: [Category; 5] = [
        Category::Normal,
        Category::DoS,
        Category::Botnet,
        Category::Probe,
        Category::BruteForce,
    ];

    /// Canonical label, as emitted by classifiers and shown in the feed
    pub fn label(self) -> &'static str {
        match self {
            Category::Normal => "Normal",
            Category::DoS => "DoS",
            Category::Botnet => "Botnet",
            Category::Probe => "Probe",
            Category::BruteForce => "BruteForce",
        }
    }

    /// True for every category other than `Normal`
    pub fn is_attack(self) -> bool {
        self != Category::Normal
    }

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = TrackerError;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .into_iter()
            .find(|c| c.label() == s)
            .ok_or_else(|| TrackerError::InvalidCategory(s.to_string()))
    }
}

/// Output of a detection source: a label and the source's confidence in it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub category: Category,
    /// Confidence in [0, 1]
    pub confidence: f64,
}

impl Detection {
    pub fn new(category: Category, confidence: f64) -> Self {
        Self { category, confidence }
    }
}

/// A detection event as recorded by the tracker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Wall-clock time of ingestion (whole seconds)
    pub timestamp: Timestamp,
    pub category: Category,
    pub confidence: f64,
    /// `confidence >= threshold` for the threshold active at ingestion
    pub is_alert: bool,
}

impl Event {
    /// Feed-style time label (`HH:MM:SS`)
    pub fn time_label(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}
