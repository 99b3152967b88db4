//! Diagnostics attached to simulation failures.
//!
//! A [`SimulationError`] pairs the structured [`SimError`] raised by a handler
//! with the canonical JSON of the operation being simulated, so that a logged
//! failure can be replayed as-is. Callers branch on [`SimulationError::kind`];
//! the rendered text is presentation only.

use serde_json::Value;
use thiserror::Error;

use crate::error::SimError;
use crate::operation::Operation;

/// A failed simulation: the failure kind plus the operation it happened in.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{kind}\n\nwhen simulating operation:\n{}", pretty(.operation))]
pub struct SimulationError {
    #[source]
    kind: SimError,
    operation: Value,
}

impl SimulationError {
    /// Wraps `kind` with the JSON form of the operation that raised it.
    pub fn new(kind: SimError, operation: Value) -> Self {
        Self { kind, operation }
    }

    /// Wraps `kind` raised while simulating `operation`.
    pub fn from_operation(kind: SimError, operation: &Operation) -> Self {
        Self::new(kind, operation.to_json())
    }

    /// The underlying failure classification
    pub fn kind(&self) -> &SimError {
        &self.kind
    }

    /// Consumes the error and returns its failure classification
    pub fn into_kind(self) -> SimError {
        self.kind
    }

    /// The canonical JSON of the operation
    pub fn operation(&self) -> &Value {
        &self.operation
    }
}

/// Pretty-printed JSON with two-space indent
fn pretty(operation: &Value) -> String {
    serde_json::to_string_pretty(operation).unwrap_or_else(|_| operation.to_string())
}

impl From<SimulationError> for SimError {
    fn from(error: SimulationError) -> Self {
        error.kind
    }
}
