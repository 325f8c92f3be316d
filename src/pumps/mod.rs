//! Seams to the collaborators around the calibration core.
//!
//! The core never drives hardware and never persists anything. A
//! [`DispenseActuator`] physically dispenses liquid and a
//! [`PumpConfigStore`] holds the flow rate configured for each pump.

use serde::{Deserialize, Serialize};

use crate::error::PumpError;

mod memory;
pub use memory::{InMemoryPumpStore, RecordingActuator};

/// Stored configuration of one pump
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PumpConfig {
    /// GPIO pin driving the pump
    pub pin: u32,
    /// Flow rate in ml/s
    pub volume_flow: f64,
    /// Volume of the tube between bottle and outlet (ml)
    #[serde(default)]
    pub tube_volume: u32,
}

impl PumpConfig {
    pub fn new(pin: u32, volume_flow: f64) -> Self {
        Self {
            pin,
            volume_flow,
            tube_volume: 0,
        }
    }
}

/// Something that can dispense a volume on a channel.
pub trait DispenseActuator {
    /// Dispense `volume_ml` on the 1-indexed `channel`
    fn dispense(&mut self, channel: usize, volume_ml: f64) -> Result<(), PumpError>;
}

/// Storage for per-pump configuration.
///
/// Indices are 0-indexed; channel = index + 1. Implementations validate
/// written values and own durability.
pub trait PumpConfigStore {
    fn pump_count(&self) -> usize;

    fn pump(&self, index: usize) -> Result<PumpConfig, PumpError>;

    /// Replace the flow rate of one pump
    fn set_volume_flow(&mut self, index: usize, volume_flow: f64) -> Result<(), PumpError>;
}

/// Shared validation for store implementations
pub fn validate_volume_flow(volume_flow: f64) -> Result<(), PumpError> {
    if !volume_flow.is_finite() || volume_flow <= 0.0 {
        return Err(PumpError::InvalidFlowRate {
            flow_rate: volume_flow,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_volume_flow() {
        assert!(validate_volume_flow(30.0).is_ok());
        assert!(validate_volume_flow(0.1).is_ok());
        assert!(validate_volume_flow(0.0).is_err());
        assert!(validate_volume_flow(-1.0).is_err());
        assert!(validate_volume_flow(f64::NAN).is_err());
    }

    #[test]
    fn test_pump_config_deserialize_without_tube_volume() {
        let json = r#"{ "pin": 14, "volume_flow": 30.0 }"#;
        let config: PumpConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config, PumpConfig::new(14, 30.0));
    }
}
