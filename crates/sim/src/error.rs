//! Error types for the simulation engine.
//!
//! [`SimError`] is the structured failure kind raised by handlers. It is never
//! reclassified on its way out: the dispatcher wraps it in a
//! [`crate::diagnostic::SimulationError`] that only adds operation context.

use std::fmt;

use alloy_primitives::{Address, FixedBytes, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Type alias for a 32-byte market ID
pub type MarketId = FixedBytes<32>;

/// Direction of a liquidity flow through a vault-market pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowDirection {
    /// Assets supplied into the market.
    Inflow,
    /// Assets withdrawn from the market.
    Outflow,
}

impl fmt::Display for FlowDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inflow => f.write_str("inflow"),
            Self::Outflow => f.write_str("outflow"),
        }
    }
}

/// Errors that can occur during simulation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// A flow exceeds the remaining public allocator budget of a vault-market pair
    #[error("max {direction} exceeded for vault \"{vault}\" on market \"{market_id}\"")]
    CapExceeded {
        direction: FlowDirection,
        vault: Address,
        market_id: MarketId,
        requested: U256,
        remaining: U256,
    },

    /// Sender cannot cover an amount out of its balance
    #[error("insufficient balance of user \"{user}\" for token \"{token}\": have {balance}, need {required}")]
    InsufficientBalance {
        user: Address,
        token: Address,
        balance: U256,
        required: U256,
    },

    /// Allowance granted to a spender does not cover a transfer
    #[error("insufficient allowance of user \"{user}\" for token \"{token}\": have {allowance}, need {required}")]
    InsufficientAllowance {
        user: Address,
        token: Address,
        allowance: U256,
        required: U256,
    },

    /// Supplying into a market the vault has no cap on
    #[error("market \"{market_id}\" is not authorized in vault \"{vault}\"")]
    UnauthorizedMarket { vault: Address, market_id: MarketId },

    /// Vault's supply in a market would exceed the market's supply cap
    #[error("supply cap exceeded for vault \"{vault}\" on market \"{market_id}\": cap is {cap}, supply would be {supply}")]
    SupplyCapExceeded {
        vault: Address,
        market_id: MarketId,
        cap: U256,
        supply: U256,
    },

    /// Insufficient position for operation
    #[error("insufficient position for user \"{user}\" on market \"{market_id}\"")]
    InsufficientPosition { user: Address, market_id: MarketId },

    /// Withdrawal would leave the market with more borrows than supply
    #[error("insufficient liquidity on market \"{market_id}\"")]
    InsufficientLiquidity { market_id: MarketId },

    /// Market not enabled in vault
    #[error("market \"{market_id}\" is not enabled in vault \"{vault}\"")]
    MarketNotEnabled { vault: Address, market_id: MarketId },

    /// Public allocator not configured
    #[error("public allocator is not configured for vault \"{vault}\"")]
    PublicAllocatorNotConfigured { vault: Address },

    /// An intermediate or stored value does not fit in 256 bits
    #[error("arithmetic overflow")]
    ArithmeticOverflow,

    /// Share conversion against a zero denominator
    #[error("division by zero")]
    DivisionByZero,

    /// Operation tag does not name a known operation
    #[error("unknown operation type \"{operation_type}\"")]
    UnknownOperationType { operation_type: String },

    /// Operation payload does not match its tag
    #[error("malformed operation: {reason}")]
    MalformedOperation { reason: String },

    /// Market missing from the snapshot
    #[error("unknown market \"{market_id}\"")]
    UnknownMarket { market_id: MarketId },

    /// Vault missing from the snapshot
    #[error("unknown vault \"{vault}\"")]
    UnknownVault { vault: Address },

    /// Position missing from the snapshot
    #[error("unknown position of user \"{user}\" on market \"{market_id}\"")]
    UnknownPosition { user: Address, market_id: MarketId },

    /// Vault-market config missing from the snapshot
    #[error("unknown config of vault \"{vault}\" for market \"{market_id}\"")]
    UnknownVaultMarketConfig { vault: Address, market_id: MarketId },

    /// Holding missing from the snapshot
    #[error("unknown holding of user \"{user}\" for token \"{token}\"")]
    UnknownHolding { user: Address, token: Address },
}

impl SimError {
    /// Returns true for failures caused by a snapshot that does not satisfy the
    /// engine's preconditions, as opposed to a business rule rejecting the operation.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            Self::UnknownMarket { .. }
                | Self::UnknownVault { .. }
                | Self::UnknownPosition { .. }
                | Self::UnknownVaultMarketConfig { .. }
                | Self::UnknownHolding { .. }
        )
    }
}

/// Result type alias for simulation operations.
pub type Result<T> = std::result::Result<T, SimError>;
