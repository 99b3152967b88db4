//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Morpho simulation CLI - Replay operations against state snapshots
#[derive(Parser, Debug)]
#[command(name = "morpho-sim")]
#[command(about = "CLI tool for simulating Morpho operations", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "table", env = "MORPHO_SIM_FORMAT")]
    pub format: OutputFormat,

    /// Log filter directives (e.g. "debug" or "morpho_rs_simulation=trace"); overrides RUST_LOG
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Simulate an operation and print the resulting changes
    Simulate(SimulateArgs),
    /// Compare two snapshots
    Diff(DiffArgs),
    /// Check whether an operation is admissible against a snapshot
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
pub struct SimulateArgs {
    /// Snapshot JSON file (can also use MORPHO_SIM_STATE env var)
    #[arg(long, env = "MORPHO_SIM_STATE")]
    pub state: PathBuf,

    /// Operation JSON file
    #[arg(long)]
    pub operation: PathBuf,

    /// Write the resulting snapshot to this file
    #[arg(long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct DiffArgs {
    /// Snapshot JSON file before
    #[arg(long)]
    pub before: PathBuf,

    /// Snapshot JSON file after
    #[arg(long)]
    pub after: PathBuf,
}

#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Snapshot JSON file (can also use MORPHO_SIM_STATE env var)
    #[arg(long, env = "MORPHO_SIM_STATE")]
    pub state: PathBuf,

    /// Operation JSON file
    #[arg(long)]
    pub operation: PathBuf,
}

#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
