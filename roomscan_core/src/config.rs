//! Fusion configuration: defaults, JSON loading and validation.

use crate::object_registry::RegistryConfig;
use crate::volume_estimator::{EstimatorConfig, CUBIC_FEET_PER_CUBIC_METER};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Every tunable of the fusion engine.
///
/// Missing JSON fields fall back to the defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FusionConfig {
    /// Minimum categorization / observation confidence (default: 0.5)
    pub probability_threshold: f64,

    /// Seconds without a merge before a record turns inactive (default: 2.0)
    pub persistence_window_secs: f64,

    /// Detector rect widening factor before point filtering (default: 1.2)
    pub expansion_factor: f64,

    /// Minimum in-region points for a volume estimate (default: 10)
    pub min_points: usize,

    /// Padding added to every side of a fitted box, meters (default: 0.1)
    pub bounds_padding: f64,

    /// m³ → reporting unit (default: 35.3147, cubic feet)
    pub volume_conversion: f64,

    /// Unit suffix used in captions and listings (default: "ft³")
    pub unit_label: String,
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            probability_threshold: 0.5,
            persistence_window_secs: 2.0,
            expansion_factor: 1.2,
            min_points: 10,
            bounds_padding: 0.1,
            volume_conversion: CUBIC_FEET_PER_CUBIC_METER,
            unit_label: "ft³".to_string(),
        }
    }
}

impl FusionConfig {
    /// Parse and validate a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: FusionConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a JSON file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Reject values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.probability_threshold) {
            return Err(ConfigError::Invalid(format!(
                "probability_threshold must be in [0, 1], got {}",
                self.probability_threshold
            )));
        }
        if !(self.persistence_window_secs >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "persistence_window_secs must be non-negative, got {}",
                self.persistence_window_secs
            )));
        }
        if !(self.expansion_factor > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "expansion_factor must be positive, got {}",
                self.expansion_factor
            )));
        }
        if !(self.bounds_padding >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "bounds_padding must be non-negative, got {}",
                self.bounds_padding
            )));
        }
        if !(self.volume_conversion > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "volume_conversion must be positive, got {}",
                self.volume_conversion
            )));
        }
        Ok(())
    }

    pub fn estimator_config(&self) -> EstimatorConfig {
        EstimatorConfig {
            expansion_factor: self.expansion_factor,
            min_points: self.min_points,
            padding: self.bounds_padding,
            volume_conversion: self.volume_conversion,
        }
    }

    pub fn registry_config(&self) -> RegistryConfig {
        RegistryConfig {
            probability_threshold: self.probability_threshold,
            volume_scale: self.volume_conversion,
        }
    }
}

/// Errors loading a `FusionConfig`.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let config = FusionConfig::default();
        assert_eq!(config.probability_threshold, 0.5);
        assert_eq!(config.persistence_window_secs, 2.0);
        assert_eq!(config.expansion_factor, 1.2);
        assert_eq!(config.min_points, 10);
        assert_eq!(config.bounds_padding, 0.1);
        assert_eq!(config.volume_conversion, 35.3147);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config =
            FusionConfig::from_json_str(r#"{ "probability_threshold": 0.7, "min_points": 25 }"#)
                .unwrap();
        assert_eq!(config.probability_threshold, 0.7);
        assert_eq!(config.min_points, 25);
        assert_eq!(config.persistence_window_secs, 2.0);
        assert_eq!(config.unit_label, "ft³");
    }

    #[test]
    fn test_metric_units_override() {
        let config =
            FusionConfig::from_json_str(r#"{ "volume_conversion": 1.0, "unit_label": "m³" }"#)
                .unwrap();
        assert_eq!(config.estimator_config().volume_conversion, 1.0);
        assert_eq!(config.registry_config().volume_scale, 1.0);
    }

    #[test]
    fn test_invalid_threshold_rejected() {
        let result = FusionConfig::from_json_str(r#"{ "probability_threshold": 1.5 }"#);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_negative_window_rejected() {
        let config = FusionConfig {
            persistence_window_secs: -1.0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result = FusionConfig::from_json_str("{ not json");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = FusionConfig::from_json_file("/nonexistent/roomscan.json");
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }
}
