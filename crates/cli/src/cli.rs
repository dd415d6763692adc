//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// ec-flux - eddy-covariance flux station
#[derive(Parser, Debug)]
#[command(
    name = "ec-flux",
    author,
    version,
    about = "Eddy-covariance flux station",
    long_about = "Acquires 10 Hz sonic anemometer and gas analyzer readings, logs them into \n\
                  fixed-period raw windows and computes gas flux, friction velocity and \n\
                  the turbulent steady-state class for every completed window."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "EC_FLUX_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "EC_FLUX_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the acquisition station
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// Recompute flux from existing raw window files
    Process(ProcessArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(short, long, default_value = "station.toml", env = "EC_FLUX_CONFIG")]
    pub config: PathBuf,

    /// Override the raw window directory
    #[arg(long, env = "EC_FLUX_RAW_DIR")]
    pub raw_dir: Option<PathBuf>,

    /// Override the flux output directory
    #[arg(long, env = "EC_FLUX_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Stop after this many seconds (0 = run until interrupted)
    #[arg(long, default_value = "0", env = "EC_FLUX_DURATION")]
    pub duration: u64,

    /// Validate configuration and exit without acquiring
    #[arg(long)]
    pub dry_run: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "EC_FLUX_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "station.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "station.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Print the resolved configuration (defaults filled in) instead of the summary
    #[arg(long)]
    pub resolved: bool,
}

/// Arguments for the `process` command
#[derive(Parser, Debug)]
pub struct ProcessArgs {
    /// Raw window files to analyse
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Configuration file supplying the flux constants (defaults when absent)
    #[arg(short, long, env = "EC_FLUX_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the flux output directory
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Print one JSON report per file
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
