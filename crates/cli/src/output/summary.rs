//! Headlines for simulation outcomes.

use alloy_chains::Chain;
use alloy_primitives::Address;
use colored::Colorize;
use morpho_rs_simulation::{SimulationError, SimulationState};
use serde_json::Value;

use super::table::truncate_address;

fn format_target(operation: &Value) -> String {
    operation
        .get("address")
        .and_then(Value::as_str)
        .and_then(|address| address.parse::<Address>().ok())
        .map(|address| truncate_address(&address.to_string()))
        .unwrap_or_else(|| "-".to_string())
}

/// One line describing a successful simulation.
pub fn format_success_headline(operation: &Value, state: &SimulationState, changes: usize) -> String {
    let operation_type = operation.get("type").and_then(Value::as_str).unwrap_or("-");

    format!(
        "{} {} on {} ({} block {}): {} field(s) changed",
        "Simulated".green().bold(),
        operation_type.bold(),
        format_target(operation),
        Chain::from_id(state.chain_id),
        state.block.number,
        changes
    )
}

/// Full diagnostic of a failed simulation, replayable as-is.
pub fn format_failure(error: &SimulationError) -> String {
    format!("{}: {}", "Simulation failed".red().bold(), error)
}
