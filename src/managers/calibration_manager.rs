// CalibrationManager: drives one calibration session at a time
//
// Single Responsibility: calibration workflow against the pump collaborators
// The pump list and channel count come from the injected store and config;
// nothing is read from global state.

use crate::calibration::{CalibrationCommit, CalibrationSession};
use crate::config::CalibrationConfig;
use crate::error::{log_calibration_error, log_pump_error, CalibrationError, ErrorCode};
use crate::events::{CalibrationEvent, CalibrationMode};
use crate::pumps::{DispenseActuator, PumpConfigStore};

/// Session plus the mode it was started in
#[derive(Debug, Clone)]
struct ActiveSession {
    session: CalibrationSession,
    mode: CalibrationMode,
    /// Committed flow rate the store has not accepted yet
    pending_commit: Option<CalibrationCommit>,
}

/// Manages the calibration workflow and hands results to the pump store
///
/// This manager handles:
/// - Starting a session for a configured pump or a free standalone channel
/// - Triggering the dispense and recording the dispense request
/// - Recording measured volumes
/// - Writing accepted flow rates to the pump store
///
/// # Example
/// ```ignore
/// let mut manager = CalibrationManager::new(actuator, store, CalibrationConfig::default());
/// manager.start_for_pump(0)?;
/// manager.dispense(100.0)?;
/// manager.record_actual_volume(95.0)?;
/// let event = manager.accept()?;
/// ```
pub struct CalibrationManager<A, S> {
    actuator: A,
    store: S,
    config: CalibrationConfig,
    active: Option<ActiveSession>,
}

impl<A: DispenseActuator, S: PumpConfigStore> CalibrationManager<A, S> {
    /// Create a manager with no calibration in progress
    pub fn new(actuator: A, store: S, config: CalibrationConfig) -> Self {
        Self {
            actuator,
            store,
            config,
            active: None,
        }
    }

    /// Start calibrating a configured pump
    ///
    /// The pump's stored flow rate becomes the session's current flow rate.
    /// A stored rate that is zero, negative or not a number is replaced by
    /// the configured default.
    ///
    /// # Errors
    /// - Calibration already in progress
    /// - `pump_index` beyond the configured pumps
    pub fn start_for_pump(&mut self, pump_index: usize) -> Result<CalibrationEvent, CalibrationError> {
        self.check_not_in_progress()?;

        let pump_count = self.store.pump_count();
        let pump = self.store.pump(pump_index).map_err(|err| {
            log_pump_error(&err, "start_for_pump");
            CalibrationError::ChannelOutOfRange {
                channel: pump_index + 1,
                channel_count: pump_count,
            }
        })?;

        let channel = pump_index + 1;
        let mode = CalibrationMode::Pump { index: pump_index };
        let current_flow_rate = if pump.volume_flow > 0.0 {
            pump.volume_flow
        } else {
            tracing::warn!(
                "[CalibrationManager] Pump {} has no usable flow rate ({}); using default {} ml/s",
                channel,
                pump.volume_flow,
                self.config.default_flow_rate
            );
            self.config.default_flow_rate
        };
        tracing::info!(
            "[CalibrationManager] Calibrating pump {} (pin {}, {} ml/s)",
            channel,
            pump.pin,
            current_flow_rate
        );
        Ok(self.begin(channel, current_flow_rate, mode))
    }

    /// Start a standalone calibration on a free channel
    ///
    /// # Arguments
    /// * `channel` - 1-indexed channel, within `1..=channel_count`
    /// * `current_flow_rate` - Known flow rate, or `None` for the configured default
    ///
    /// # Errors
    /// - Calibration already in progress
    /// - Channel out of range
    pub fn start_standalone(
        &mut self,
        channel: usize,
        current_flow_rate: Option<f64>,
    ) -> Result<CalibrationEvent, CalibrationError> {
        self.check_not_in_progress()?;

        let channel_count = self.config.channel_count;
        if channel == 0 || channel > channel_count {
            let err = CalibrationError::ChannelOutOfRange {
                channel,
                channel_count,
            };
            log_calibration_error(&err, "start_standalone");
            return Err(err);
        }

        let current_flow_rate = current_flow_rate.unwrap_or(self.config.default_flow_rate);
        Ok(self.begin(channel, current_flow_rate, CalibrationMode::Standalone))
    }

    /// Dispense the target volume and record the request
    ///
    /// After a successful dispense the measurement is seeded with
    /// `actual = target`, so a reading is available right away. A seed that
    /// cannot be computed is logged and skipped; the dispense still counts.
    ///
    /// # Returns
    /// The `DispenseRequested` event followed by the seeded `MeasurementRecorded`,
    /// when seeding succeeded.
    ///
    /// # Errors
    /// - Calibration not in progress
    /// - Target volume outside `[min_target_volume, max_target_volume]` or
    ///   above `max_actual_volume`
    /// - Already dispensed in this session
    /// - Actuator failure (session stays awaiting the dispense)
    pub fn dispense(&mut self, target_volume: f64) -> Result<Vec<CalibrationEvent>, CalibrationError> {
        let min = self.config.min_target_volume;
        let max = self
            .config
            .max_target_volume
            .min(self.config.max_actual_volume);
        let active = Self::active_mut(&mut self.active, "dispense")?;

        if !(min..=max).contains(&target_volume) {
            let err = CalibrationError::InvalidTargetVolume {
                target_volume,
                min,
                max,
            };
            log_calibration_error(&err, "dispense");
            return Err(err);
        }

        let session = &mut active.session;
        if !session.state().is_awaiting_dispense() {
            let err = CalibrationError::InvalidTransition {
                state: session.state().display_name(),
                action: "dispense",
            };
            log_calibration_error(&err, "dispense");
            return Err(err);
        }

        let channel = session.channel();
        self.actuator
            .dispense(channel, target_volume)
            .map_err(|err| {
                log_pump_error(&err, "dispense");
                CalibrationError::DispenseFailed {
                    reason: err.message(),
                }
            })?;

        session.record_dispense_request(target_volume)?;
        let mut events = vec![CalibrationEvent::DispenseRequested {
            channel,
            target_volume,
        }];

        match session.record_actual_volume(target_volume) {
            Ok(reading) => events.push(CalibrationEvent::MeasurementRecorded {
                channel,
                actual_volume: target_volume,
                reading,
            }),
            Err(err) => {
                log_calibration_error(&err, "dispense_seed");
                tracing::warn!(
                    "[CalibrationManager] Channel {}: no seeded reading for {} ml",
                    channel,
                    target_volume
                );
            }
        }

        Ok(events)
    }

    /// Record the measured volume for the active session
    ///
    /// # Errors
    /// - Calibration not in progress
    /// - Nothing dispensed yet
    /// - Invalid measurement (previous reading is cleared)
    pub fn record_actual_volume(
        &mut self,
        actual_volume: f64,
    ) -> Result<CalibrationEvent, CalibrationError> {
        let active = Self::active_mut(&mut self.active, "record_actual_volume")?;
        let reading = active
            .session
            .record_actual_volume(actual_volume)
            .inspect_err(|err| log_calibration_error(err, "record_actual_volume"))?;

        if reading.status.is_warning() {
            tracing::warn!(
                "[CalibrationManager] Channel {}: {:.2} ml/s deviates strongly from {} ml/s",
                active.session.channel(),
                reading.corrected_flow_rate,
                active.session.current_flow_rate()
            );
        }

        Ok(CalibrationEvent::MeasurementRecorded {
            channel: active.session.channel(),
            actual_volume,
            reading,
        })
    }

    /// Accept the calibration and write it to the pump store
    ///
    /// On success the session ends and `Committed` is returned. When the
    /// store rejects the value the committed reading is held so the caller
    /// can retry the write or abort; the session no longer takes measurements.
    ///
    /// # Errors
    /// - Calibration not in progress
    /// - Standalone session
    /// - No measurement, or reading out of bounds
    /// - Store failure
    pub fn accept(&mut self) -> Result<CalibrationEvent, CalibrationError> {
        let active = Self::active_mut(&mut self.active, "accept")?;

        let CalibrationMode::Pump { index: pump_index } = active.mode else {
            let err = CalibrationError::PumpModeOnly;
            log_calibration_error(&err, "accept");
            return Err(err);
        };

        let commit = match active.pending_commit {
            Some(commit) => commit,
            None => {
                let commit = active
                    .session
                    .commit()
                    .inspect_err(|err| log_calibration_error(err, "accept"))?;
                active.pending_commit = Some(commit);
                commit
            }
        };

        self.store
            .set_volume_flow(pump_index, commit.flow_rate)
            .map_err(|err| {
                log_pump_error(&err, "accept");
                let err = CalibrationError::StoreFailed {
                    reason: err.message(),
                };
                log_calibration_error(&err, "accept");
                err
            })?;

        self.active = None;
        tracing::info!(
            "[CalibrationManager] Pump {} flow rate {} -> {:.2} ml/s",
            commit.channel,
            commit.previous_flow_rate,
            commit.flow_rate
        );

        Ok(CalibrationEvent::Committed { pump_index, commit })
    }

    /// Discard the active session without storing anything
    pub fn abort(&mut self) -> Result<CalibrationEvent, CalibrationError> {
        let active = self.active.take().ok_or_else(|| {
            let err = CalibrationError::NotInProgress;
            log_calibration_error(&err, "abort");
            err
        })?;

        tracing::info!(
            "[CalibrationManager] Calibration on channel {} aborted",
            active.session.channel()
        );
        Ok(CalibrationEvent::Aborted {
            channel: active.session.channel(),
        })
    }

    pub fn is_in_progress(&self) -> bool {
        self.active.is_some()
    }

    /// Active session, if any
    pub fn session(&self) -> Option<&CalibrationSession> {
        self.active.as_ref().map(|active| &active.session)
    }

    pub fn mode(&self) -> Option<CalibrationMode> {
        self.active.as_ref().map(|active| active.mode)
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    // ========================================================================
    // HELPER METHODS
    // ========================================================================

    fn begin(
        &mut self,
        channel: usize,
        current_flow_rate: f64,
        mode: CalibrationMode,
    ) -> CalibrationEvent {
        if current_flow_rate <= 0.0 {
            tracing::warn!(
                "[CalibrationManager] Channel {} has a non-positive flow rate ({}); readings will be out of bounds",
                channel,
                current_flow_rate
            );
        }

        let session =
            CalibrationSession::new(channel, current_flow_rate, self.config.thresholds)
                .with_max_actual_volume(self.config.max_actual_volume);
        self.active = Some(ActiveSession {
            session,
            mode,
            pending_commit: None,
        });

        CalibrationEvent::SessionStarted {
            channel,
            mode,
            current_flow_rate,
        }
    }

    /// Check that calibration is not already in progress
    fn check_not_in_progress(&self) -> Result<(), CalibrationError> {
        if self.active.is_some() {
            let err = CalibrationError::AlreadyInProgress;
            log_calibration_error(&err, "start_calibration");
            return Err(err);
        }
        Ok(())
    }

    fn active_mut<'a>(
        active: &'a mut Option<ActiveSession>,
        context: &str,
    ) -> Result<&'a mut ActiveSession, CalibrationError> {
        active.as_mut().ok_or_else(|| {
            let err = CalibrationError::NotInProgress;
            log_calibration_error(&err, context);
            err
        })
    }
}
