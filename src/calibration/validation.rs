// Flow-rate validation logic for calibration
//
// This module classifies a corrected flow rate against absolute safety bounds
// and against the relative deviation from the flow rate in effect before
// calibration. Classification is separate from the arithmetic so the
// transform never fails.

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// Lowest flow rate a pump may be configured with (ml/s)
pub const MIN_FLOW_RATE: f64 = 0.1;
/// Highest flow rate a pump may be configured with (ml/s)
pub const MAX_FLOW_RATE: f64 = 1000.0;
/// Warn when the corrected flow rate drops below 50% of the original
pub const MIN_DEVIATION_RATIO: f64 = 0.5;
/// Warn when the corrected flow rate exceeds 300% of the original
pub const MAX_DEVIATION_RATIO: f64 = 3.0;

/// Classification of a corrected flow rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowRateStatus {
    /// Within bounds and within the deviation window
    Valid,
    /// Outside `[min_flow_rate, max_flow_rate]`; blocks commit
    OutOfBounds,
    /// Within bounds but a drastic change; commit allowed with a warning
    UnrealisticDeviation,
}

impl FlowRateStatus {
    /// Whether a reading with this status may be committed
    pub fn allows_commit(&self) -> bool {
        !matches!(self, FlowRateStatus::OutOfBounds)
    }

    /// Whether the presentation layer should show a warning
    pub fn is_warning(&self) -> bool {
        matches!(self, FlowRateStatus::UnrealisticDeviation)
    }
}

/// Safety thresholds applied by [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowRateThresholds {
    pub min_flow_rate: f64,
    pub max_flow_rate: f64,
    pub min_deviation_ratio: f64,
    pub max_deviation_ratio: f64,
}

impl Default for FlowRateThresholds {
    fn default() -> Self {
        Self {
            min_flow_rate: MIN_FLOW_RATE,
            max_flow_rate: MAX_FLOW_RATE,
            min_deviation_ratio: MIN_DEVIATION_RATIO,
            max_deviation_ratio: MAX_DEVIATION_RATIO,
        }
    }
}

/// Classify a corrected flow rate
///
/// # Arguments
/// * `corrected_flow_rate` - Flow rate produced by the correction (ml/s)
/// * `current_flow_rate` - Flow rate in effect before calibration (ml/s)
/// * `thresholds` - Absolute bounds and deviation window
///
/// # Returns
/// * `Ok(FlowRateStatus::OutOfBounds)` - Strictly outside the absolute bounds
///   (checked first, boundaries themselves are valid)
/// * `Ok(FlowRateStatus::UnrealisticDeviation)` - Ratio strictly outside the
///   deviation window
/// * `Ok(FlowRateStatus::Valid)` - Otherwise
/// * `Err(CalibrationError::DivisionByZero)` - `current_flow_rate` is zero and
///   the corrected value passed the bounds check
pub fn classify(
    corrected_flow_rate: f64,
    current_flow_rate: f64,
    thresholds: &FlowRateThresholds,
) -> Result<FlowRateStatus, CalibrationError> {
    // NaN fails `contains` as well, so it lands here too
    if !(thresholds.min_flow_rate..=thresholds.max_flow_rate).contains(&corrected_flow_rate) {
        return Ok(FlowRateStatus::OutOfBounds);
    }

    let ratio = deviation_ratio(corrected_flow_rate, current_flow_rate)?;
    if ratio > thresholds.max_deviation_ratio || ratio < thresholds.min_deviation_ratio {
        return Ok(FlowRateStatus::UnrealisticDeviation);
    }

    Ok(FlowRateStatus::Valid)
}

/// Corrected flow rate divided by the pre-calibration flow rate
pub fn deviation_ratio(
    corrected_flow_rate: f64,
    current_flow_rate: f64,
) -> Result<f64, CalibrationError> {
    if current_flow_rate == 0.0 {
        return Err(CalibrationError::DivisionByZero);
    }
    Ok(corrected_flow_rate / current_flow_rate)
}
