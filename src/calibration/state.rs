// CalibrationState - workflow position of a calibration session
//
// A session starts in AwaitingDispense, moves to AwaitingMeasurement once,
// when the dispense is requested, and ends in Committed. It never moves back;
// recalibrating means creating a new session.

use serde::{Deserialize, Serialize};

use super::validation::FlowRateStatus;

/// Corrected flow rate derived from one measurement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationReading {
    /// Corrected flow rate rounded to 2 decimal places (ml/s)
    pub corrected_flow_rate: f64,
    /// Corrected flow rate at full precision (ml/s)
    pub raw_flow_rate: f64,
    /// Corrected / current flow rate; absent when the bounds check already failed
    pub deviation_ratio: Option<f64>,
    pub status: FlowRateStatus,
}

/// A recorded actual volume and the reading computed from it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub actual_volume: f64,
    pub reading: CalibrationReading,
}

/// Workflow state of a calibration session
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CalibrationState {
    /// Initial state: the target volume has not been dispensed yet
    #[default]
    AwaitingDispense,
    /// Dispensed; waiting for (or holding) the measured volume
    AwaitingMeasurement {
        target_volume: f64,
        measurement: Option<Measurement>,
    },
    /// Terminal: the reading was handed out for persistence
    Committed {
        target_volume: f64,
        measurement: Measurement,
    },
}

impl CalibrationState {
    /// Get human-readable name for logs and error messages
    pub fn display_name(&self) -> &'static str {
        match self {
            CalibrationState::AwaitingDispense => "awaiting dispense",
            CalibrationState::AwaitingMeasurement { .. } => "awaiting measurement",
            CalibrationState::Committed { .. } => "committed",
        }
    }

    pub fn is_awaiting_dispense(&self) -> bool {
        matches!(self, CalibrationState::AwaitingDispense)
    }

    pub fn is_committed(&self) -> bool {
        matches!(self, CalibrationState::Committed { .. })
    }

    /// Target volume, once dispensed
    pub fn target_volume(&self) -> Option<f64> {
        match self {
            CalibrationState::AwaitingDispense => None,
            CalibrationState::AwaitingMeasurement { target_volume, .. }
            | CalibrationState::Committed { target_volume, .. } => Some(*target_volume),
        }
    }

    /// Latest valid measurement, if any
    pub fn measurement(&self) -> Option<&Measurement> {
        match self {
            CalibrationState::AwaitingDispense => None,
            CalibrationState::AwaitingMeasurement { measurement, .. } => measurement.as_ref(),
            CalibrationState::Committed { measurement, .. } => Some(measurement),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_awaiting_dispense() {
        let state = CalibrationState::default();
        assert!(state.is_awaiting_dispense());
        assert_eq!(state.target_volume(), None);
        assert!(state.measurement().is_none());
    }

    #[test]
    fn test_states_are_distinct() {
        let awaiting = CalibrationState::AwaitingMeasurement {
            target_volume: 100.0,
            measurement: None,
        };
        assert_ne!(CalibrationState::AwaitingDispense, awaiting);
        assert_eq!(awaiting.target_volume(), Some(100.0));
        assert!(!awaiting.is_awaiting_dispense());
    }

    #[test]
    fn test_display_name() {
        assert_eq!(
            CalibrationState::AwaitingDispense.display_name(),
            "awaiting dispense"
        );
        let awaiting = CalibrationState::AwaitingMeasurement {
            target_volume: 50.0,
            measurement: None,
        };
        assert_eq!(awaiting.display_name(), "awaiting measurement");
    }

    #[test]
    fn test_committed_keeps_measurement() {
        let measurement = Measurement {
            actual_volume: 95.0,
            reading: CalibrationReading {
                corrected_flow_rate: 31.58,
                raw_flow_rate: 31.578947368421055,
                deviation_ratio: Some(31.58 / 30.0),
                status: FlowRateStatus::Valid,
            },
        };
        let committed = CalibrationState::Committed {
            target_volume: 100.0,
            measurement,
        };
        assert!(committed.is_committed());
        assert!(!committed.is_awaiting_dispense());
        assert_eq!(committed.display_name(), "committed");
        assert_eq!(committed.target_volume(), Some(100.0));
        assert_eq!(committed.measurement(), Some(&measurement));
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_string(&CalibrationState::AwaitingDispense).unwrap();
        assert_eq!(json, r#"{"state":"awaiting_dispense"}"#);

        let awaiting = CalibrationState::AwaitingMeasurement {
            target_volume: 100.0,
            measurement: None,
        };
        let json = serde_json::to_string(&awaiting).unwrap();
        assert!(json.contains(r#""state":"awaiting_measurement""#));
        assert!(json.contains(r#""target_volume":100.0"#));
    }
}
