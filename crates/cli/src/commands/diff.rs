//! `diff` command implementation.

use std::process::ExitCode;

use anyhow::Result;

use super::load_state;
use crate::cli::{DiffArgs, OutputFormat};
use crate::output::format_changes_table;

pub fn run_diff(args: &DiffArgs, format: OutputFormat) -> Result<ExitCode> {
    let before = load_state(&args.before)?;
    let after = load_state(&args.after)?;

    let changes = before.diff(&after);

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&changes)?);
        }
        OutputFormat::Table => {
            println!("{}", format_changes_table(&changes));
        }
    }

    Ok(ExitCode::SUCCESS)
}
