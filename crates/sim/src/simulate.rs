//! Operation dispatcher.
//!
//! [`simulate_operation`] routes an [`Operation`] to its handler and wraps any
//! failure in a [`SimulationError`] carrying the operation. It performs no
//! business logic of its own.

use serde_json::Value;
use tracing::{debug, debug_span, warn};

use crate::diagnostic::SimulationError;
use crate::handlers::handle_public_reallocate;
use crate::operation::{Operation, OperationArgs};
use crate::state::SimulationState;

/// Simulates `operation` against `state` and returns the resulting snapshot.
///
/// The input snapshot is never modified; on failure it remains the
/// authoritative state.
///
/// # Example
///
/// ```rust,ignore
/// use morpho_rs_simulation::{simulate_operation, Operation, Withdrawal};
///
/// let operation = Operation::public_reallocate(
///     sender,
///     vault,
///     vec![Withdrawal { id: market_a1, assets }],
///     market_a2,
/// );
///
/// let next = simulate_operation(&operation, &state)?;
/// for change in state.diff(&next) {
///     println!("{} {} {}", change.entity, change.key, change.field);
/// }
/// ```
pub fn simulate_operation(
    operation: &Operation,
    state: &SimulationState,
) -> Result<SimulationState, SimulationError> {
    let span = debug_span!(
        "simulate_operation",
        operation_type = operation.operation_type(),
        sender = %operation.sender,
        address = %operation.address,
    );
    let _entered = span.enter();

    let result = match &operation.args {
        OperationArgs::MetaMorphoPublicReallocate(args) => {
            handle_public_reallocate(operation.sender, operation.address, args, state)
        }
    };

    match result {
        Ok(next) => {
            debug!("operation simulated");
            Ok(next)
        }
        Err(kind) => {
            warn!(error = %kind, "operation rejected");
            Err(SimulationError::from_operation(kind, operation))
        }
    }
}

/// Parses `operation` from its canonical JSON form, then simulates it.
///
/// Parse failures, including unknown operation types, are reported with the
/// raw JSON as context.
pub fn simulate_json_operation(
    operation: &Value,
    state: &SimulationState,
) -> Result<SimulationState, SimulationError> {
    let parsed = Operation::from_json(operation).map_err(|kind| {
        warn!(error = %kind, "operation could not be parsed");
        SimulationError::new(kind, operation.clone())
    })?;

    simulate_operation(&parsed, state)
}
