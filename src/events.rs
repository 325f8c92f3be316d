//! Notifications produced by the calibration workflow.
//!
//! Every manager operation returns the event it produced instead of invoking
//! callbacks, so the presentation layer decides how to refresh itself.

use serde::{Deserialize, Serialize};

use crate::calibration::{CalibrationCommit, CalibrationReading};

/// How a session is bound to hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CalibrationMode {
    /// Bound to a configured pump; may be accepted into the store
    Pump { index: usize },
    /// Free channel selection; readings only
    Standalone,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum CalibrationEvent {
    SessionStarted {
        channel: usize,
        mode: CalibrationMode,
        current_flow_rate: f64,
    },
    DispenseRequested {
        channel: usize,
        target_volume: f64,
    },
    MeasurementRecorded {
        channel: usize,
        actual_volume: f64,
        reading: CalibrationReading,
    },
    /// Flow rate written to the pump store; the session is over
    Committed {
        pump_index: usize,
        commit: CalibrationCommit,
    },
    Aborted {
        channel: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::FlowRateStatus;

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = CalibrationEvent::DispenseRequested {
            channel: 2,
            target_volume: 100.0,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "dispense_requested");
        assert_eq!(json["payload"]["channel"], 2);
        assert_eq!(json["payload"]["target_volume"], 100.0);
    }

    #[test]
    fn test_committed_event_payload() {
        let event = CalibrationEvent::Committed {
            pump_index: 0,
            commit: CalibrationCommit {
                channel: 1,
                previous_flow_rate: 30.0,
                flow_rate: 31.58,
                status: FlowRateStatus::Valid,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "committed");
        assert_eq!(json["payload"]["commit"]["flow_rate"], 31.58);
        assert_eq!(json["payload"]["commit"]["status"], "valid");
    }

    #[test]
    fn test_mode_serialization() {
        let json = serde_json::to_value(CalibrationMode::Pump { index: 3 }).unwrap();
        assert_eq!(json["mode"], "pump");
        assert_eq!(json["index"], 3);

        let json = serde_json::to_value(CalibrationMode::Standalone).unwrap();
        assert_eq!(json["mode"], "standalone");
    }
}
