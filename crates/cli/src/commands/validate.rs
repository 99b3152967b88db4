//! `validate` command implementation.

use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use morpho_rs_simulation::simulate_json_operation;
use serde_json::json;

use super::{load_operation, load_state};
use crate::cli::{OutputFormat, ValidateArgs};

pub fn run_validate(args: &ValidateArgs, format: OutputFormat) -> Result<ExitCode> {
    let state = load_state(&args.state)?;
    let operation = load_operation(&args.operation)?;

    let result = simulate_json_operation(&operation, &state);

    match format {
        OutputFormat::Json => {
            let report = match &result {
                Ok(_) => json!({ "admissible": true }),
                Err(error) => json!({
                    "admissible": false,
                    "precondition_violation": error.kind().is_precondition_violation(),
                    "error": error.kind().to_string(),
                }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => match &result {
            Ok(_) => println!("{}", "admissible".green().bold()),
            Err(error) => println!("{}: {}", "not admissible".red().bold(), error.kind()),
        },
    }

    Ok(if result.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
