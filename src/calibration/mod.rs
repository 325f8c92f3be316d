// Calibration module - pump flow-rate correction and session workflow
//
// This module provides:
// 1. compute_corrected_flow_rate: the pure correction transform
// 2. classify: bounds and deviation checks on a corrected flow rate
// 3. CalibrationSession: the dispense -> measure -> commit workflow
//
// The calibration workflow:
// 1. Create a CalibrationSession for a channel and its current flow rate
// 2. Record the dispense request (target volume)
// 3. Record the measured volume, as often as needed
// 4. Commit the corrected flow rate unless it is out of bounds; this ends the session

pub mod flow_rate;
pub mod session;
pub mod state;
pub mod validation;

pub use flow_rate::{compute_corrected_flow_rate, round_flow_rate};
pub use session::{compute_reading, CalibrationCommit, CalibrationSession};
pub use state::{CalibrationReading, CalibrationState, Measurement};
pub use validation::{
    classify, deviation_ratio, FlowRateStatus, FlowRateThresholds, MAX_DEVIATION_RATIO,
    MAX_FLOW_RATE, MIN_DEVIATION_RATIO, MIN_FLOW_RATE,
};
