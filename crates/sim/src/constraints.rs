//! Flow cap checks for the public allocator.
//!
//! A check never mutates anything. Handlers run it for every proposed flow
//! before writing the flow into their draft snapshot.

use alloy_primitives::{Address, U256};

use crate::error::{FlowDirection, MarketId, Result, SimError};
use crate::vault::PublicAllocatorMarketConfig;

/// Checks that `assets` can be withdrawn from `market_id` on behalf of `vault`.
///
/// # Errors
///
/// - [`SimError::CapExceeded`] with [`FlowDirection::Outflow`] if `assets`
///   is strictly greater than the remaining `max_out`
pub fn check_outflow(
    vault: Address,
    market_id: MarketId,
    assets: U256,
    config: &PublicAllocatorMarketConfig,
) -> Result<()> {
    check_flow(FlowDirection::Outflow, vault, market_id, assets, config.max_out)
}

/// Checks that `assets` can be supplied to `market_id` on behalf of `vault`.
///
/// # Errors
///
/// - [`SimError::CapExceeded`] with [`FlowDirection::Inflow`] if `assets`
///   is strictly greater than the remaining `max_in`
pub fn check_inflow(
    vault: Address,
    market_id: MarketId,
    assets: U256,
    config: &PublicAllocatorMarketConfig,
) -> Result<()> {
    check_flow(FlowDirection::Inflow, vault, market_id, assets, config.max_in)
}

fn check_flow(
    direction: FlowDirection,
    vault: Address,
    market_id: MarketId,
    requested: U256,
    remaining: U256,
) -> Result<()> {
    if requested > remaining {
        return Err(SimError::CapExceeded {
            direction,
            vault,
            market_id,
            requested,
            remaining,
        });
    }
    Ok(())
}
