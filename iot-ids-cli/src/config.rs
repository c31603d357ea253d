//! Configuration loading and parsing

use anyhow::{Context, Result};
use iot_ids_core::{GeneratorConfig, TrackerConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Main application configuration (loaded from config.toml)
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub tracker: TrackerSection,
    #[serde(default)]
    pub generator: GeneratorSection,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TrackerSection {
    #[serde(flatten)]
    pub settings: TrackerConfig,
    #[serde(default = "default_true")]
    pub auto_refresh: bool,
}

impl Default for TrackerSection {
    fn default() -> Self {
        Self {
            settings: TrackerConfig::default(),
            auto_refresh: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneratorSection {
    /// Fixed seed for a reproducible stream (random when absent)
    pub seed: Option<u64>,
    /// Category label -> weight; the default traffic mix when absent
    pub weights: Option<BTreeMap<String, f64>>,
}

impl GeneratorSection {
    /// Resolve the generator weights, validating labels and sum
    pub fn generator_config(&self) -> iot_ids_core::Result<GeneratorConfig> {
        match &self.weights {
            Some(weights) => {
                GeneratorConfig::from_labels(weights.iter().map(|(label, w)| (label.as_str(), *w)))
            }
            None => Ok(GeneratorConfig::default()),
        }
    }
}

impl AppConfig {
    /// Check every section; errors name the offending setting
    pub fn validate(&self) -> Result<()> {
        self.tracker
            .settings
            .validate()
            .context("Invalid [tracker] settings")?;
        self.generator
            .generator_config()
            .context("Invalid [generator] settings")?;
        Ok(())
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: AppConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    config.validate()?;
    log::debug!("Configuration loaded: {:?}", config);

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use iot_ids_core::Category;
    use std::io::Write;

    #[test]
    fn test_config_deserialization() {
        let toml_content = r#"
            [tracker]
            confidence_threshold = 0.95
            log_capacity = 50
            refresh_interval_secs = 1.5
            auto_refresh = false

            [generator]
            seed = 7

            [generator.weights]
            Normal = 0.9
            DoS = 0.1
        "#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.tracker.settings.confidence_threshold, 0.95);
        assert_eq!(config.tracker.settings.log_capacity, 50);
        assert!(!config.tracker.auto_refresh);
        assert_eq!(config.generator.seed, Some(7));

        let generator = config.generator.generator_config().unwrap();
        assert_eq!(generator.weight(Category::DoS), 0.1);
        assert_eq!(generator.weight(Category::Probe), 0.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: AppConfig = toml::from_str("").unwrap();
        assert_eq!(config.tracker.settings, TrackerConfig::default());
        assert!(config.tracker.auto_refresh);
        assert_eq!(config.generator.seed, None);
        assert_eq!(config.generator.generator_config().unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[tracker]\nlog_capacity = 3").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.tracker.settings.log_capacity, 3);
    }

    #[test]
    fn test_load_config_rejects_bad_weights() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generator.weights]\nNormal = 0.5\nDoS = 0.4").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("must sum to 1.0"));
    }

    #[test]
    fn test_load_config_rejects_unknown_label() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[generator.weights]\nNormal = 0.5\nWorm = 0.5").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("Worm"));
    }

    #[test]
    fn test_example_config_loads() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("dashboard.example.toml");
        let config = load_config(&path).unwrap();
        assert_eq!(config.generator.generator_config().unwrap(), GeneratorConfig::default());
    }

    #[test]
    fn test_missing_file() {
        assert!(load_config(Path::new("does-not-exist.toml")).is_err());
    }
}
