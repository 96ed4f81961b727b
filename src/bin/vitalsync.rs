//! VitalSync CLI - offline reporting over exported readings
//!
//! Commands:
//! - report: aggregate a file of readings and print the refresh report
//! - validate: check readings against physiological ranges

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::Utc;
use vitalsync::adapters::AdapterRegistry;
use vitalsync::refresh::RefreshService;
use vitalsync::types::{HealthReading, UserProfile};
use vitalsync::validate::validate_reading;
use vitalsync::{MetricHistory, VITALSYNC_VERSION};

/// VitalSync - multi-platform health aggregation and insights
#[derive(Parser)]
#[command(name = "vitalsync")]
#[command(version = VITALSYNC_VERSION)]
#[command(about = "Aggregate health readings and derive insights", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate readings and print the full refresh report
    Report {
        /// Readings file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,

        /// Metric history file for trend labeling
        #[arg(long)]
        history: Option<PathBuf>,

        /// User height in centimeters, enables BMI rules
        #[arg(long)]
        height_cm: Option<f64>,

        /// Output format
        #[arg(long, default_value = "json-pretty")]
        output_format: OutputFormat,
    },

    /// Validate readings against physiological ranges
    Validate {
        /// Readings file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Input format
        #[arg(long, default_value = "json")]
        input_format: InputFormat,
    },
}

#[derive(Clone, ValueEnum)]
enum InputFormat {
    /// JSON array of readings
    Json,
    /// Newline-delimited JSON (one reading per line)
    Ndjson,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    Json,
    JsonPretty,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid input: {0}")]
    Json(#[from] serde_json::Error),
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("vitalsync: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Report {
            input,
            input_format,
            history,
            height_cm,
            output_format,
        } => cmd_report(&input, input_format, history.as_deref(), height_cm, output_format),
        Commands::Validate {
            input,
            input_format,
        } => cmd_validate(&input, input_format),
    }
}

fn cmd_report(
    input: &Path,
    input_format: InputFormat,
    history_path: Option<&Path>,
    height_cm: Option<f64>,
    output_format: OutputFormat,
) -> Result<(), CliError> {
    let readings = read_readings(input, input_format)?;
    let history = match history_path {
        Some(path) => MetricHistory::from_json(&fs::read_to_string(path)?)?,
        None => MetricHistory::new(),
    };
    let profile = UserProfile { height_cm };

    let service = RefreshService::new(AdapterRegistry::new());
    let report = service.report_from_readings(&readings, &profile, &history, Utc::now());

    let rendered = match output_format {
        OutputFormat::Json => serde_json::to_string(&report)?,
        OutputFormat::JsonPretty => serde_json::to_string_pretty(&report)?,
    };
    println!("{rendered}");
    Ok(())
}

fn cmd_validate(input: &Path, input_format: InputFormat) -> Result<(), CliError> {
    let readings = read_readings(input, input_format)?;
    let mut failures = 0usize;
    for (index, reading) in readings.iter().enumerate() {
        if let Err(err) = validate_reading(reading) {
            failures += 1;
            eprintln!("reading {index} ({}): {err}", reading.platform);
        }
    }
    if failures > 0 {
        return Err(CliError::Io(std::io::Error::other(format!(
            "{failures} of {} readings failed validation",
            readings.len()
        ))));
    }
    println!("{} readings valid", readings.len());
    Ok(())
}

fn read_readings(input: &Path, format: InputFormat) -> Result<Vec<HealthReading>, CliError> {
    let raw = if input.as_os_str() == "-" {
        let mut buffer = String::new();
        std::io::stdin().read_to_string(&mut buffer)?;
        buffer
    } else {
        fs::read_to_string(input)?
    };

    match format {
        InputFormat::Json => Ok(serde_json::from_str(&raw)?),
        InputFormat::Ndjson => raw
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).map_err(CliError::from))
            .collect(),
    }
}
