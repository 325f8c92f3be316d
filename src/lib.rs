// Pump Calibration Core
// Flow-rate correction for liquid-dispensing pumps from a target/actual volume pair

// Module declarations
pub mod calibration;
pub mod config;
pub mod error;
pub mod events;
pub mod managers;
pub mod pumps;

// Re-exports for convenience
pub use calibration::{
    classify, compute_corrected_flow_rate, CalibrationCommit, CalibrationReading,
    CalibrationSession, CalibrationState, FlowRateStatus, FlowRateThresholds,
};
pub use config::{AppConfig, CalibrationConfig};
pub use error::{CalibrationError, ErrorCode, PumpError};
pub use events::{CalibrationEvent, CalibrationMode};
pub use managers::CalibrationManager;
