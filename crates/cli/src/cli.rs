//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Sim Sensors - update scheduling runtime for simulated sensors
#[derive(Parser, Debug)]
#[command(
    name = "sim-sensors",
    author,
    version,
    about = "Simulated sensor update scheduling runtime",
    long_about = "A scheduling runtime for simulated sensors.\n\n\
                  Loads a sensor manifest, drives the sensor manager over a fixed-step \n\
                  sim clock, and updates each sensor at its configured rate, with \n\
                  rendering-dependent sensors serialized behind the render lock."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SIM_SENSORS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SIM_SENSORS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduling loop
    Run(RunArgs),

    /// Validate a manifest file without running
    Validate(ValidateArgs),

    /// Display manifest information
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to manifest file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "sensors.toml",
        env = "SIM_SENSORS_CONFIG"
    )]
    pub config: PathBuf,

    /// Override number of steps from the manifest (0 = until interrupted)
    #[arg(long, env = "SIM_SENSORS_STEPS")]
    pub steps: Option<u64>,

    /// Override sim-time step size in seconds from the manifest
    #[arg(long)]
    pub step_s: Option<f64>,

    /// Pace steps against the wall clock
    #[arg(long)]
    pub real_time: bool,

    /// Validate manifest and exit without running
    #[arg(long)]
    pub dry_run: bool,

    /// Capacity of each container's command channel
    #[arg(long, default_value = "32", env = "SIM_SENSORS_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SIM_SENSORS_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to manifest file to validate
    #[arg(short, long, default_value = "sensors.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to manifest file
    #[arg(short, long, default_value = "sensors.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show detailed per-sensor information
    #[arg(long)]
    pub sensors: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
