use crate::error::PumpError;

use super::{validate_volume_flow, DispenseActuator, PumpConfig, PumpConfigStore};

/// In-memory pump store used for deterministic testing and CLI tooling.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPumpStore {
    pumps: Vec<PumpConfig>,
}

impl InMemoryPumpStore {
    pub fn new(pumps: Vec<PumpConfig>) -> Self {
        Self { pumps }
    }

    pub fn pumps(&self) -> &[PumpConfig] {
        &self.pumps
    }
}

impl PumpConfigStore for InMemoryPumpStore {
    fn pump_count(&self) -> usize {
        self.pumps.len()
    }

    fn pump(&self, index: usize) -> Result<PumpConfig, PumpError> {
        self.pumps
            .get(index)
            .copied()
            .ok_or(PumpError::IndexOutOfRange {
                index,
                pump_count: self.pumps.len(),
            })
    }

    fn set_volume_flow(&mut self, index: usize, volume_flow: f64) -> Result<(), PumpError> {
        validate_volume_flow(volume_flow)?;
        let pump_count = self.pumps.len();
        let pump = self
            .pumps
            .get_mut(index)
            .ok_or(PumpError::IndexOutOfRange { index, pump_count })?;
        pump.volume_flow = volume_flow;
        Ok(())
    }
}

/// Actuator that only records the requested dispenses.
///
/// Can be configured to fail for exercising error paths.
#[derive(Debug, Clone, Default)]
pub struct RecordingActuator {
    requests: Vec<(usize, f64)>,
    fault: Option<String>,
}

impl RecordingActuator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actuator whose every dispense fails with `details`
    pub fn failing(details: impl Into<String>) -> Self {
        Self {
            requests: Vec::new(),
            fault: Some(details.into()),
        }
    }

    /// Recorded `(channel, volume_ml)` pairs, oldest first
    pub fn requests(&self) -> &[(usize, f64)] {
        &self.requests
    }
}

impl DispenseActuator for RecordingActuator {
    fn dispense(&mut self, channel: usize, volume_ml: f64) -> Result<(), PumpError> {
        if let Some(details) = &self.fault {
            return Err(PumpError::ActuatorFault {
                details: details.clone(),
            });
        }
        tracing::info!(
            "[RecordingActuator] Dispensing {} ml on channel {}",
            volume_ml,
            channel
        );
        self.requests.push((channel, volume_ml));
        Ok(())
    }
}
