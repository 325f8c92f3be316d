//! Configuration management for calibration tuning
//!
//! This module provides runtime configuration loading from JSON files so
//! thresholds and input limits can be adjusted without recompilation.
//! Pump flow rates themselves are not stored here; they belong to the
//! pump configuration store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::calibration::FlowRateThresholds;

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub calibration: CalibrationConfig,
}

/// Calibration workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Bounds and deviation window used to classify readings
    pub thresholds: FlowRateThresholds,
    /// Flow rate assumed for standalone sessions without a known rate (ml/s)
    pub default_flow_rate: f64,
    /// Number of addressable channels (bottles) for standalone sessions
    pub channel_count: usize,
    /// Smallest volume that may be dispensed for calibration (ml)
    pub min_target_volume: f64,
    /// Largest volume that may be dispensed for calibration (ml)
    pub max_target_volume: f64,
    /// Largest measured volume accepted (ml)
    pub max_actual_volume: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            thresholds: FlowRateThresholds::default(),
            default_flow_rate: 30.0,
            channel_count: 24,
            min_target_volume: 10.0,
            max_target_volume: 200.0,
            max_actual_volume: 200.0,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The loaded configuration, or the defaults when the file is missing or
    /// the JSON is invalid (a warning is logged in both cases).
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    tracing::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    tracing::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.calibration.default_flow_rate, 30.0);
        assert_eq!(config.calibration.channel_count, 24);
        assert_eq!(config.calibration.min_target_volume, 10.0);
        assert_eq!(config.calibration.max_target_volume, 200.0);
        assert_eq!(config.calibration.thresholds.max_flow_rate, 1000.0);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = AppConfig::default();
        let json = serde_json::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(
            parsed.calibration.thresholds,
            config.calibration.thresholds
        );
        assert_eq!(
            parsed.calibration.channel_count,
            config.calibration.channel_count
        );
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "calibration": { "channel_count": 8, "thresholds": { "max_deviation_ratio": 2.0 } } }"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.calibration.channel_count, 8);
        assert_eq!(config.calibration.thresholds.max_deviation_ratio, 2.0);
        assert_eq!(config.calibration.thresholds.min_deviation_ratio, 0.5);
        assert_eq!(config.calibration.default_flow_rate, 30.0);
    }

    #[test]
    fn test_load_missing_file_falls_back_to_defaults() {
        let config = AppConfig::load_from_file("/nonexistent/calibration_config.json");
        assert_eq!(config.calibration.channel_count, 24);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!(
            "pump_calibration_config_{}.json",
            std::process::id()
        ));
        {
            let mut file = fs::File::create(&path).unwrap();
            write!(file, r#"{{ "calibration": {{ "default_flow_rate": 12.5 }} }}"#).unwrap();
        }

        let config = AppConfig::load_from_file(&path);
        assert_eq!(config.calibration.default_flow_rate, 12.5);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_load_invalid_json_falls_back_to_defaults() {
        let path = std::env::temp_dir().join(format!(
            "pump_calibration_invalid_{}.json",
            std::process::id()
        ));
        fs::write(&path, "{ not json").unwrap();

        let config = AppConfig::load_from_file(&path);
        assert_eq!(config.calibration.default_flow_rate, 30.0);

        let _ = fs::remove_file(&path);
    }
}
