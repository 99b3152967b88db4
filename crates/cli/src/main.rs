//! Morpho simulation CLI - Replay operations against state snapshots.

mod cli;
mod commands;
mod output;

use std::env::var;
use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{registry, EnvFilter};

use cli::{Cli, Commands};
use commands::{run_diff, run_simulate, run_validate};

const DEFAULT_LOG_DIRECTIVES: &str = "morpho_sim=warn,morpho_rs_simulation=warn";

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    setup(cli.log_level.as_deref())?;

    match cli.command {
        Commands::Simulate(args) => run_simulate(&args, cli.format),
        Commands::Diff(args) => run_diff(&args, cli.format),
        Commands::Validate(args) => run_validate(&args, cli.format),
    }
}

fn setup(log_level: Option<&str>) -> Result<()> {
    let directives = match (log_level, var("RUST_LOG")) {
        (Some(level), _) => level.to_owned(),
        (None, Ok(value)) if !value.trim().is_empty() => value,
        _ => DEFAULT_LOG_DIRECTIVES.to_owned(),
    };

    registry()
        .with(EnvFilter::builder().parse(directives)?)
        .with(layer().with_writer(std::io::stderr))
        .init();

    Ok(())
}
