// Calibration error types and constants

use crate::error::ErrorCode;
use log::error;
use std::fmt;

/// Calibration error code constants
///
/// These constants provide a single source of truth for error codes
/// shared between the core and the presentation layer that maps them to
/// user-visible warnings.
///
/// Error code range: 2001-2012
pub struct CalibrationErrorCodes {}

impl CalibrationErrorCodes {
    /// Measured volume is zero, negative, non-finite or above the input limit
    pub const INVALID_MEASUREMENT: i32 = 2001;

    /// Current flow rate is zero while computing the deviation ratio
    pub const DIVISION_BY_ZERO: i32 = 2002;

    /// Commit attempted while the reading is out of bounds
    pub const COMMIT_BLOCKED: i32 = 2003;

    /// Commit attempted before any measurement was recorded
    pub const NOT_MEASURED: i32 = 2004;

    /// Action not allowed in the current session state
    pub const INVALID_TRANSITION: i32 = 2005;

    /// Channel or pump index outside the configured range
    pub const CHANNEL_OUT_OF_RANGE: i32 = 2006;

    /// Target volume outside the configured dispense limits
    pub const INVALID_TARGET_VOLUME: i32 = 2007;

    /// No calibration session is active
    pub const NOT_IN_PROGRESS: i32 = 2008;

    /// A calibration session is already active
    pub const ALREADY_IN_PROGRESS: i32 = 2009;

    /// Accept requested for a session that is not bound to a pump
    pub const PUMP_MODE_ONLY: i32 = 2010;

    /// The dispense actuator reported a failure
    pub const DISPENSE_FAILED: i32 = 2011;

    /// The configuration store rejected the corrected flow rate
    pub const STORE_FAILED: i32 = 2012;
}

/// Log a calibration error with structured context
///
/// This function logs calibration errors with structured fields including:
/// - error_code: Numeric error code for programmatic handling
/// - component: The component where the error occurred
/// - message: Human-readable error message
/// - context: Additional contextual information
pub fn log_calibration_error(err: &CalibrationError, context: &str) {
    error!(
        "Calibration error in {}: code={}, component=CalibrationManager, message={}",
        context,
        err.code(),
        err.message()
    );
}

/// Calibration-related errors
///
/// `OutOfBounds` and `UnrealisticDeviation` are not errors: they are
/// statuses carried by a reading. Only precondition violations and blocked
/// workflow actions end up here.
///
/// Error code range: 2001-2012
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// Measured volume cannot be used for a correction
    InvalidMeasurement { actual_volume: f64 },

    /// Current flow rate is zero, so the deviation ratio is undefined
    DivisionByZero,

    /// Corrected flow rate is outside the absolute bounds
    CommitBlocked { flow_rate: f64 },

    /// No measurement has been recorded yet
    NotMeasured,

    /// Action not valid in the current state
    InvalidTransition {
        state: &'static str,
        action: &'static str,
    },

    /// Channel outside `1..=channel_count`
    ChannelOutOfRange { channel: usize, channel_count: usize },

    /// Target volume outside the dispense limits
    InvalidTargetVolume { target_volume: f64, min: f64, max: f64 },

    /// No session active
    NotInProgress,

    /// Session already active
    AlreadyInProgress,

    /// Standalone sessions cannot be committed
    PumpModeOnly,

    /// Dispense actuator failure
    DispenseFailed { reason: String },

    /// Configuration store failure
    StoreFailed { reason: String },
}

impl ErrorCode for CalibrationError {
    fn code(&self) -> i32 {
        match self {
            CalibrationError::InvalidMeasurement { .. } => {
                CalibrationErrorCodes::INVALID_MEASUREMENT
            }
            CalibrationError::DivisionByZero => CalibrationErrorCodes::DIVISION_BY_ZERO,
            CalibrationError::CommitBlocked { .. } => CalibrationErrorCodes::COMMIT_BLOCKED,
            CalibrationError::NotMeasured => CalibrationErrorCodes::NOT_MEASURED,
            CalibrationError::InvalidTransition { .. } => {
                CalibrationErrorCodes::INVALID_TRANSITION
            }
            CalibrationError::ChannelOutOfRange { .. } => {
                CalibrationErrorCodes::CHANNEL_OUT_OF_RANGE
            }
            CalibrationError::InvalidTargetVolume { .. } => {
                CalibrationErrorCodes::INVALID_TARGET_VOLUME
            }
            CalibrationError::NotInProgress => CalibrationErrorCodes::NOT_IN_PROGRESS,
            CalibrationError::AlreadyInProgress => CalibrationErrorCodes::ALREADY_IN_PROGRESS,
            CalibrationError::PumpModeOnly => CalibrationErrorCodes::PUMP_MODE_ONLY,
            CalibrationError::DispenseFailed { .. } => CalibrationErrorCodes::DISPENSE_FAILED,
            CalibrationError::StoreFailed { .. } => CalibrationErrorCodes::STORE_FAILED,
        }
    }

    fn message(&self) -> String {
        match self {
            CalibrationError::InvalidMeasurement { actual_volume } => {
                format!("Invalid measurement: {} ml", actual_volume)
            }
            CalibrationError::DivisionByZero => {
                "Current flow rate is zero, deviation ratio undefined".to_string()
            }
            CalibrationError::CommitBlocked { flow_rate } => {
                format!("Flow rate {:.2} ml/s out of bounds, commit blocked", flow_rate)
            }
            CalibrationError::NotMeasured => "No measurement recorded".to_string(),
            CalibrationError::InvalidTransition { state, action } => {
                format!("Cannot {} while {}", action, state)
            }
            CalibrationError::ChannelOutOfRange {
                channel,
                channel_count,
            } => {
                format!("Channel {} out of range [1, {}]", channel, channel_count)
            }
            CalibrationError::InvalidTargetVolume {
                target_volume,
                min,
                max,
            } => {
                format!(
                    "Target volume {} ml out of range [{}, {}]",
                    target_volume, min, max
                )
            }
            CalibrationError::NotInProgress => "Calibration not in progress".to_string(),
            CalibrationError::AlreadyInProgress => "Calibration already in progress".to_string(),
            CalibrationError::PumpModeOnly => {
                "Accepting a calibration is only possible in pump mode".to_string()
            }
            CalibrationError::DispenseFailed { reason } => {
                format!("Dispense failed: {}", reason)
            }
            CalibrationError::StoreFailed { reason } => {
                format!("Failed to update pump configuration: {}", reason)
            }
        }
    }
}

impl fmt::Display for CalibrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CalibrationError::{:?} (code {}): {}",
            self,
            self.code(),
            self.message()
        )
    }
}

impl std::error::Error for CalibrationError {}
