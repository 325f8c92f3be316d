// Error types for the pump calibration core
//
// This module defines custom error types for calibration and pump operations,
// providing structured error handling with numeric error codes suitable for
// display layers and diagnostic tooling.

mod calibration;
mod pump;

pub use calibration::{log_calibration_error, CalibrationError, CalibrationErrorCodes};
pub use pump::{log_pump_error, PumpError, PumpErrorCodes};

/// Error codes for structured error reporting
///
/// This trait provides a standard way to get error codes and messages
/// from custom error types, enabling consistent error handling in
/// whatever presentation layer sits on top of the core.
pub trait ErrorCode {
    /// Get the numeric error code
    fn code(&self) -> i32;

    /// Get the human-readable error message
    fn message(&self) -> String;
}
