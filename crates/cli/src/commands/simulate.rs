//! `simulate` command implementation.

use std::fs;
use std::process::ExitCode;

use anyhow::{Context, Result};
use morpho_rs_simulation::simulate_json_operation;
use tracing::info;

use super::{load_operation, load_state};
use crate::cli::{OutputFormat, SimulateArgs};
use crate::output::{format_changes_table, format_failure, format_success_headline};

pub fn run_simulate(args: &SimulateArgs, format: OutputFormat) -> Result<ExitCode> {
    let state = load_state(&args.state)?;
    let operation = load_operation(&args.operation)?;

    let next = match simulate_json_operation(&operation, &state) {
        Ok(next) => next,
        Err(error) => {
            eprintln!("{}", format_failure(&error));
            return Ok(ExitCode::FAILURE);
        }
    };

    if let Some(path) = &args.output {
        let json = serde_json::to_string_pretty(&next)?;
        fs::write(path, json)
            .with_context(|| format!("failed to write snapshot {}", path.display()))?;
        info!(path = %path.display(), "resulting snapshot written");
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&next)?);
        }
        OutputFormat::Table => {
            let changes = state.diff(&next);
            println!("{}", format_success_headline(&operation, &next, changes.len()));
            println!("{}", format_changes_table(&changes));
        }
    }

    Ok(ExitCode::SUCCESS)
}
