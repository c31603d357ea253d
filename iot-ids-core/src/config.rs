//! Tracker and generator configuration types
//!
//! Configuration is validated once, before any event is ingested. Invalid
//! values are rejected with [`TrackerError::InvalidConfiguration`] rather than
//! clamped or corrected.

use crate::types::{Category, Result, TrackerError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Allowed deviation of the weight sum from 1.0
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

/// Configuration for the event tracker and its driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Events with `confidence >= confidence_threshold` are flagged as alerts
    #[serde(default = "default_threshold")]
    pub confidence_threshold: f64,

    /// Maximum number of events kept in the windowed log
    #[serde(default = "default_capacity")]
    pub log_capacity: usize,

    /// Delay between automatic ticks (advisory, used by the driver only)
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: f64,
}

fn default_threshold() -> f64 {
    0.90
}

fn default_capacity() -> usize {
    100
}

fn default_refresh_interval() -> f64 {
    3.0
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: default_threshold(),
            log_capacity: default_capacity(),
            refresh_interval_secs: default_refresh_interval(),
        }
    }
}

impl TrackerConfig {
    /// Create a tracker configuration with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set the alert threshold
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Builder method: set the log capacity
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Builder method: set the refresh interval in seconds
    pub fn with_refresh_interval(mut self, secs: f64) -> Self {
        self.refresh_interval_secs = secs;
        self
    }

    /// Check every option, returning the first problem found
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.confidence_threshold)?;

        if self.log_capacity == 0 {
            return Err(TrackerError::InvalidConfiguration(
                "log_capacity must be greater than 0".to_string(),
            ));
        }

        validate_refresh_interval(self.refresh_interval_secs)?;

        Ok(())
    }
}

/// Check a refresh interval and convert it to a `Duration`
pub fn validate_refresh_interval(secs: f64) -> Result<Duration> {
    if !secs.is_finite() || secs <= 0.0 {
        return Err(TrackerError::InvalidConfiguration(format!(
            "refresh_interval_secs must be a positive number, got {}",
            secs
        )));
    }

    Duration::try_from_secs_f64(secs)
        .map_err(|e| TrackerError::InvalidConfiguration(format!("refresh_interval_secs: {}", e)))
}

/// Check that a confidence threshold lies in [0, 1]
pub fn validate_threshold(threshold: f64) -> Result<()> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(TrackerError::InvalidConfiguration(format!(
            "confidence_threshold must be within [0, 1], got {}",
            threshold
        )))
    }
}

/// Configuration for the simulated detection generator
///
/// Categories missing from `weights` are never drawn. Deserialized values
/// must still go through [`GeneratorConfig::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    pub weights: BTreeMap<Category, f64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            weights: BTreeMap::from([
                (Category::Normal, 0.85),
                (Category::DoS, 0.05),
                (Category::Botnet, 0.04),
                (Category::Probe, 0.04),
                (Category::BruteForce, 0.02),
            ]),
        }
    }
}

impl GeneratorConfig {
    /// Create a generator configuration with the default traffic mix
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a validated configuration from explicit weights
    pub fn with_weights(weights: impl IntoIterator<Item = (Category, f64)>) -> Result<Self> {
        let config = Self {
            weights: weights.into_iter().collect(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Build a validated configuration from label-keyed weights
    ///
    /// Fails with [`TrackerError::InvalidCategory`] on an unknown label.
    pub fn from_labels<'a>(weights: impl IntoIterator<Item = (&'a str, f64)>) -> Result<Self> {
        let mut typed = BTreeMap::new();
        for (label, weight) in weights {
            typed.insert(label.parse::<Category>()?, weight);
        }
        Self::with_weights(typed)
    }

    /// Weight of a category (0 when absent)
    pub fn weight(&self, category: Category) -> f64 {
        self.weights.get(&category).copied().unwrap_or(0.0)
    }

    /// Weights for all categories, in display order
    pub fn weight_vector(&self) -> [f64; 5] {
        Category::ALL.map(|c| self.weight(c))
    }

    /// Weights must be finite, non-negative and sum to 1.0
    pub fn validate(&self) -> Result<()> {
        for (category, weight) in &self.weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(TrackerError::InvalidConfiguration(format!(
                    "weight for {} must be a non-negative number, got {}",
                    category, weight
                )));
            }
        }

        let sum: f64 = self.weights.values().sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(TrackerError::InvalidConfiguration(format!(
                "generator weights must sum to 1.0, got {}",
                sum
            )));
        }

        Ok(())
    }
}
