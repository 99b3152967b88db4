//! Command implementations.

pub mod diff;
pub mod simulate;
pub mod validate;

pub use diff::run_diff;
pub use simulate::run_simulate;
pub use validate::run_validate;

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use morpho_rs_simulation::SimulationState;
use serde_json::Value;
use tracing::debug;

/// Read and parse a snapshot JSON file.
pub(crate) fn load_state(path: &Path) -> Result<SimulationState> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read snapshot {}", path.display()))?;
    let state: SimulationState = serde_json::from_str(&text)
        .with_context(|| format!("invalid snapshot {}", path.display()))?;

    debug!(
        path = %path.display(),
        chain_id = state.chain_id,
        block = state.block.number,
        markets = state.markets.len(),
        vaults = state.vaults.len(),
        "snapshot loaded"
    );

    Ok(state)
}

/// Read an operation JSON file without interpreting it.
///
/// The operation is parsed by the simulator so that an unknown type is
/// reported as a simulation failure, with the raw JSON as context.
pub(crate) fn load_operation(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read operation {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid JSON in {}", path.display()))
}
