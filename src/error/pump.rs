// Pump collaborator error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Pump error code constants
///
/// Error code range: 3001-3003
pub struct PumpErrorCodes {}

impl PumpErrorCodes {
    /// Pump index beyond the configured pump list
    pub const INDEX_OUT_OF_RANGE: i32 = 3001;

    /// Flow rate rejected by the configuration store
    pub const INVALID_FLOW_RATE: i32 = 3002;

    /// Dispense actuator fault
    pub const ACTUATOR_FAULT: i32 = 3003;
}

/// Log a pump error with structured context
pub fn log_pump_error(err: &PumpError, context: &str) {
    error!(
        "Pump error in {}: code={}, component=PumpConfigStore, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Errors raised by the external pump collaborators
/// (configuration store and dispense actuator).
#[derive(Debug, Clone, PartialEq)]
pub enum PumpError {
    /// Pump index outside the configured pump list
    IndexOutOfRange { index: usize, pump_count: usize },

    /// Flow rate must be positive and finite
    InvalidFlowRate { flow_rate: f64 },

    /// Hardware or driver failure while dispensing
    ActuatorFault { details: String },
}

impl ErrorCode for PumpError {
    fn code(&self) -> i32 {
        match self {
            PumpError::IndexOutOfRange { .. } => PumpErrorCodes::INDEX_OUT_OF_RANGE,
            PumpError::InvalidFlowRate { .. } => PumpErrorCodes::INVALID_FLOW_RATE,
            PumpError::ActuatorFault { .. } => PumpErrorCodes::ACTUATOR_FAULT,
        }
    }

    fn message(&self) -> String {
        match self {
            PumpError::IndexOutOfRange { index, pump_count } => {
                if *pump_count == 0 {
                    format!("Pump index {} out of range (no pumps configured)", index)
                } else {
                    format!(
                        "Pump index {} out of range (max: {})",
                        index,
                        pump_count - 1
                    )
                }
            }
            PumpError::InvalidFlowRate { flow_rate } => {
                format!("Flow rate must be positive (got {})", flow_rate)
            }
            PumpError::ActuatorFault { details } => format!("Actuator fault: {}", details),
        }
    }
}

impl fmt::Display for PumpError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PumpError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for PumpError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pump_error_codes() {
        assert_eq!(
            PumpError::IndexOutOfRange {
                index: 3,
                pump_count: 2
            }
            .code(),
            3001
        );
        assert_eq!(PumpError::InvalidFlowRate { flow_rate: 0.0 }.code(), 3002);
        assert_eq!(
            PumpError::ActuatorFault {
                details: "test".to_string()
            }
            .code(),
            3003
        );
    }

    #[test]
    fn test_index_out_of_range_message() {
        let err = PumpError::IndexOutOfRange {
            index: 5,
            pump_count: 3,
        };
        assert_eq!(err.message(), "Pump index 5 out of range (max: 2)");

        let err = PumpError::IndexOutOfRange {
            index: 0,
            pump_count: 0,
        };
        assert!(err.message().contains("no pumps configured"));
    }

    #[test]
    fn test_error_code_trait() {
        let pump_err: &dyn ErrorCode = &PumpError::InvalidFlowRate { flow_rate: -1.0 };
        assert_eq!(pump_err.code(), PumpErrorCodes::INVALID_FLOW_RATE);
    }
}
