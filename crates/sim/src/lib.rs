//! Morpho Operation Simulation SDK
//!
//! This crate simulates, off-chain and deterministically, the effect of a single
//! Morpho operation against a snapshot of protocol state.
//!
//! # Overview
//!
//! - [`SimulationState`] is an immutable snapshot of markets, vaults, positions,
//!   vault-market configs and token holdings
//! - [`Operation`] is a typed operation, dispatched by [`simulate_operation`]
//!   to its handler
//! - Handlers return a new snapshot sharing every untouched entity with the base,
//!   or a [`SimulationError`] whose [`SimulationError::kind`] is the structured
//!   failure and whose text embeds the operation for replay
//!
//! The same input always yields the same snapshot or the same failure, so a
//! simulation can be run speculatively and repeatedly.
//!
//! # Example
//!
//! ```rust,ignore
//! use morpho_rs_simulation::{simulate_operation, Operation, SimError, Withdrawal};
//!
//! let operation = Operation::public_reallocate(sender, vault, withdrawals, supply_market_id);
//!
//! match simulate_operation(&operation, &state) {
//!     Ok(next) => println!("{} fields changed", state.diff(&next).len()),
//!     Err(error) if matches!(error.kind(), SimError::CapExceeded { .. }) => {
//!         println!("not admissible: {}", error.kind());
//!     }
//!     Err(error) => return Err(error.into()),
//! }
//! ```

pub mod bigint;
pub mod constraints;
pub mod diagnostic;
pub mod error;
pub mod handlers;
pub mod holding;
pub mod market;
pub mod math;
pub mod operation;
pub mod position;
pub mod simulate;
pub mod state;
pub mod vault;

// Re-export commonly used types
pub use diagnostic::SimulationError;
pub use error::{FlowDirection, MarketId, SimError};

pub use constraints::{check_inflow, check_outflow};
pub use holding::{Erc20Allowances, Holding, NATIVE_ADDRESS};
pub use market::{Market, MarketParams};
pub use math::{RoundingDirection, VIRTUAL_ASSETS, VIRTUAL_SHARES};
pub use operation::{
    Operation, OperationArgs, PublicReallocateArgs, Withdrawal, METAMORPHO_PUBLIC_REALLOCATE,
};
pub use position::Position;
pub use simulate::{simulate_json_operation, simulate_operation};
pub use state::{BlockInfo, EntityKind, SimulationState, StateChange};
pub use vault::{PublicAllocatorConfig, PublicAllocatorMarketConfig, Vault, VaultMarketConfig};
