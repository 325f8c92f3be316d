use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pump_calibration::calibration::compute_reading;
use pump_calibration::config::AppConfig;
use pump_calibration::error::{log_pump_error, CalibrationError, ErrorCode};
use pump_calibration::managers::CalibrationManager;
use pump_calibration::pumps::{
    validate_volume_flow, InMemoryPumpStore, PumpConfig, RecordingActuator,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "calibration_cli",
    about = "Flow-rate calibration harness for dispensing pumps"
)]
struct Cli {
    /// JSON configuration file (defaults are used when missing or invalid)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute and classify a corrected flow rate for one measurement
    Compute {
        #[arg(long, allow_negative_numbers = true)]
        flow_rate: f64,
        #[arg(long, allow_negative_numbers = true)]
        target: f64,
        #[arg(long, allow_negative_numbers = true)]
        actual: f64,
    },
    /// Run a scripted pump calibration and print every event as a JSON line
    Session {
        #[arg(long, allow_negative_numbers = true)]
        flow_rate: f64,
        #[arg(long, allow_negative_numbers = true)]
        target: f64,
        /// Measured volume; repeat to re-measure
        #[arg(long, allow_negative_numbers = true)]
        actual: Vec<f64>,
        /// GPIO pin reported for the simulated pump
        #[arg(long, default_value_t = 14)]
        pin: u32,
        /// Accept the last reading into the simulated pump store
        #[arg(long)]
        accept: bool,
    },
    /// Print the default configuration
    Defaults,
}

#[derive(Serialize)]
struct ComputeReport {
    current_flow_rate: f64,
    target_volume: f64,
    actual_volume: f64,
    corrected_flow_rate: f64,
    raw_flow_rate: f64,
    deviation_ratio: Option<f64>,
    status: pump_calibration::FlowRateStatus,
}

#[derive(Serialize)]
struct ErrorReport {
    code: i32,
    error: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let config = cli
        .config
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    match cli.command {
        Commands::Compute {
            flow_rate,
            target,
            actual,
        } => run_compute(&config, flow_rate, target, actual),
        Commands::Session {
            flow_rate,
            target,
            actual,
            pin,
            accept,
        } => run_session(&config, flow_rate, target, &actual, pin, accept),
        Commands::Defaults => {
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(ExitCode::from(0))
        }
    }
}

fn run_compute(config: &AppConfig, flow_rate: f64, target: f64, actual: f64) -> Result<ExitCode> {
    if !actual.is_finite() || actual <= 0.0 {
        return emit_error(&CalibrationError::InvalidMeasurement {
            actual_volume: actual,
        });
    }

    match compute_reading(flow_rate, target, actual, &config.calibration.thresholds) {
        Ok(reading) => {
            let report = ComputeReport {
                current_flow_rate: flow_rate,
                target_volume: target,
                actual_volume: actual,
                corrected_flow_rate: reading.corrected_flow_rate,
                raw_flow_rate: reading.raw_flow_rate,
                deviation_ratio: reading.deviation_ratio,
                status: reading.status,
            };
            println!("{}", serde_json::to_string(&report)?);
            Ok(ExitCode::from(0))
        }
        Err(err) => emit_error(&err),
    }
}

fn run_session(
    config: &AppConfig,
    flow_rate: f64,
    target: f64,
    actuals: &[f64],
    pin: u32,
    accept: bool,
) -> Result<ExitCode> {
    if let Err(err) = validate_volume_flow(flow_rate) {
        log_pump_error(&err, "session");
        return emit_error(&err);
    }

    let store = InMemoryPumpStore::new(vec![PumpConfig::new(pin, flow_rate)]);
    let mut manager = CalibrationManager::new(
        RecordingActuator::new(),
        store,
        config.calibration.clone(),
    );

    let started = match manager.start_for_pump(0) {
        Ok(event) => event,
        Err(err) => return emit_error(&err),
    };
    print_json(&started)?;

    match manager.dispense(target) {
        Ok(events) => {
            for event in &events {
                print_json(event)?;
            }
        }
        Err(err) => return emit_error(&err),
    }

    for &actual in actuals {
        match manager.record_actual_volume(actual) {
            Ok(event) => print_json(&event)?,
            Err(err) => return emit_error(&err),
        }
    }

    if accept {
        match manager.accept() {
            Ok(event) => print_json(&event)?,
            Err(err) => return emit_error(&err),
        }
    }

    Ok(ExitCode::from(0))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let line = serde_json::to_string(value).context("serializing event")?;
    println!("{}", line);
    Ok(())
}

fn emit_error<E: ErrorCode>(err: &E) -> Result<ExitCode> {
    let report = ErrorReport {
        code: err.code(),
        error: err.message(),
    };
    eprintln!("{}", serde_json::to_string(&report)?);
    Ok(ExitCode::from(2))
}
