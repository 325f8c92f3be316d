// Managers Module
//
// Workflow managers sitting between the calibration core and its
// collaborators.
//
// - CalibrationManager: calibration session lifecycle and pump store updates

pub mod calibration_manager;

pub use calibration_manager::CalibrationManager;
