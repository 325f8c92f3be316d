// CalibrationSession - one calibration attempt for one channel
//
// The session records the dispense request, recomputes the corrected flow
// rate each time a measured volume is recorded and hands the result back on
// commit, which ends the session. It never touches persistent state: the
// caller stores the committed flow rate.

use serde::{Deserialize, Serialize};

use super::flow_rate::{compute_corrected_flow_rate, round_flow_rate};
use super::state::{CalibrationReading, CalibrationState, Measurement};
use super::validation::{classify, FlowRateStatus, FlowRateThresholds};
use crate::error::CalibrationError;

/// Result of a successful commit, handed to the configuration store
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationCommit {
    /// 1-indexed channel the flow rate belongs to
    pub channel: usize,
    /// Flow rate in effect before calibration (ml/s)
    pub previous_flow_rate: f64,
    /// Corrected flow rate, rounded to 2 decimal places (ml/s)
    pub flow_rate: f64,
    pub status: FlowRateStatus,
}

/// CalibrationSession tracks a single dispense/measure cycle
#[derive(Debug, Clone)]
pub struct CalibrationSession {
    channel: usize,
    current_flow_rate: f64,
    thresholds: FlowRateThresholds,
    max_actual_volume: Option<f64>,
    state: CalibrationState,
}

impl CalibrationSession {
    /// Create a session in `AwaitingDispense`
    ///
    /// # Arguments
    /// * `channel` - 1-indexed channel being calibrated
    /// * `current_flow_rate` - Flow rate in effect before calibration (ml/s)
    /// * `thresholds` - Bounds used to classify readings
    pub fn new(channel: usize, current_flow_rate: f64, thresholds: FlowRateThresholds) -> Self {
        Self {
            channel,
            current_flow_rate,
            thresholds,
            max_actual_volume: None,
            state: CalibrationState::AwaitingDispense,
        }
    }

    /// Reject measured volumes above `max_actual_volume`
    pub fn with_max_actual_volume(mut self, max_actual_volume: f64) -> Self {
        self.max_actual_volume = Some(max_actual_volume);
        self
    }

    pub fn channel(&self) -> usize {
        self.channel
    }

    pub fn current_flow_rate(&self) -> f64 {
        self.current_flow_rate
    }

    pub fn thresholds(&self) -> &FlowRateThresholds {
        &self.thresholds
    }

    pub fn state(&self) -> &CalibrationState {
        &self.state
    }

    pub fn target_volume(&self) -> Option<f64> {
        self.state.target_volume()
    }

    pub fn actual_volume(&self) -> Option<f64> {
        self.state.measurement().map(|m| m.actual_volume)
    }

    /// Latest reading, present only after a valid measurement
    pub fn reading(&self) -> Option<&CalibrationReading> {
        self.state.measurement().map(|m| &m.reading)
    }

    pub fn status(&self) -> Option<FlowRateStatus> {
        self.reading().map(|r| r.status)
    }

    /// Record that `target_volume` ml were requested from the dispenser
    ///
    /// Only valid in `AwaitingDispense`; moves the session to
    /// `AwaitingMeasurement`.
    pub fn record_dispense_request(&mut self, target_volume: f64) -> Result<(), CalibrationError> {
        if !self.state.is_awaiting_dispense() {
            return Err(self.invalid_transition("record dispense request"));
        }

        self.state = CalibrationState::AwaitingMeasurement {
            target_volume,
            measurement: None,
        };
        tracing::debug!(
            "[CalibrationSession] Channel {} dispense requested: {} ml",
            self.channel,
            target_volume
        );
        Ok(())
    }

    /// Record the measured volume and recompute the reading
    ///
    /// Repeatable while in `AwaitingMeasurement`. A rejected measurement
    /// clears the previous reading so nothing stale can be committed.
    ///
    /// # Errors
    /// * `InvalidTransition` - No dispense recorded yet, or already committed
    /// * `InvalidMeasurement` - `actual_volume` is zero, negative, not finite
    ///   or above the configured maximum
    /// * `DivisionByZero` - Current flow rate is zero and the corrected value
    ///   passed the bounds check
    pub fn record_actual_volume(
        &mut self,
        actual_volume: f64,
    ) -> Result<CalibrationReading, CalibrationError> {
        let current_flow_rate = self.current_flow_rate;
        let thresholds = self.thresholds;
        let channel = self.channel;
        let max_actual_volume = self.max_actual_volume.unwrap_or(f64::INFINITY);

        let (target_volume, measurement) = match &mut self.state {
            CalibrationState::AwaitingMeasurement {
                target_volume,
                measurement,
            } => (*target_volume, measurement),
            other => {
                return Err(CalibrationError::InvalidTransition {
                    state: other.display_name(),
                    action: "record actual volume",
                });
            }
        };

        // Drop the previous reading before anything can fail
        *measurement = None;

        if !actual_volume.is_finite() || actual_volume <= 0.0 || actual_volume > max_actual_volume
        {
            return Err(CalibrationError::InvalidMeasurement { actual_volume });
        }

        let reading =
            compute_reading(current_flow_rate, target_volume, actual_volume, &thresholds)?;
        *measurement = Some(Measurement {
            actual_volume,
            reading,
        });

        tracing::debug!(
            "[CalibrationSession] Channel {} measured {} ml -> {:.2} ml/s ({:?})",
            channel,
            actual_volume,
            reading.corrected_flow_rate,
            reading.status
        );
        Ok(reading)
    }

    /// Whether `commit` would succeed
    pub fn can_commit(&self) -> bool {
        !self.state.is_committed() && self.status().is_some_and(|status| status.allows_commit())
    }

    /// Produce the corrected flow rate for persistence and end the session
    ///
    /// On success the session moves to `Committed`; every later operation is
    /// rejected. A failed commit leaves the state untouched.
    ///
    /// # Errors
    /// * `InvalidTransition` - Still awaiting the dispense, or already committed
    /// * `NotMeasured` - No valid measurement recorded
    /// * `CommitBlocked` - Reading is out of bounds
    pub fn commit(&mut self) -> Result<CalibrationCommit, CalibrationError> {
        let (target_volume, measurement) = match self.state {
            CalibrationState::AwaitingMeasurement {
                target_volume,
                measurement,
            } => (target_volume, measurement),
            _ => return Err(self.invalid_transition("commit")),
        };

        let measurement = measurement.ok_or(CalibrationError::NotMeasured)?;
        let reading = measurement.reading;
        if !reading.status.allows_commit() {
            return Err(CalibrationError::CommitBlocked {
                flow_rate: reading.corrected_flow_rate,
            });
        }

        self.state = CalibrationState::Committed {
            target_volume,
            measurement,
        };
        tracing::debug!(
            "[CalibrationSession] Channel {} committed {:.2} ml/s",
            self.channel,
            reading.corrected_flow_rate
        );

        Ok(CalibrationCommit {
            channel: self.channel,
            previous_flow_rate: self.current_flow_rate,
            flow_rate: reading.corrected_flow_rate,
            status: reading.status,
        })
    }

    fn invalid_transition(&self, action: &'static str) -> CalibrationError {
        CalibrationError::InvalidTransition {
            state: self.state.display_name(),
            action,
        }
    }
}

/// Correct, round and classify one measurement
///
/// Classification runs on the rounded value, which is also the value
/// reported and committed.
pub fn compute_reading(
    current_flow_rate: f64,
    target_volume: f64,
    actual_volume: f64,
    thresholds: &FlowRateThresholds,
) -> Result<CalibrationReading, CalibrationError> {
    let raw_flow_rate = compute_corrected_flow_rate(current_flow_rate, target_volume, actual_volume);
    let corrected_flow_rate = round_flow_rate(raw_flow_rate);
    let status = classify(corrected_flow_rate, current_flow_rate, thresholds)?;

    let deviation_ratio = match status {
        FlowRateStatus::OutOfBounds => None,
        _ => Some(corrected_flow_rate / current_flow_rate),
    };

    Ok(CalibrationReading {
        corrected_flow_rate,
        raw_flow_rate,
        deviation_ratio,
        status,
    })
}
