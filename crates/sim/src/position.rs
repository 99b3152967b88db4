//! Position tracking for Morpho Blue markets.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{MarketId, Result, SimError};
use crate::market::Market;
use crate::math::{self, RoundingDirection};

/// Represents a user's position in a Morpho Blue market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// The user holding this position
    pub user: Address,
    /// The market ID
    pub market_id: MarketId,
    /// Amount of supply shares held
    #[serde(with = "crate::bigint")]
    pub supply_shares: U256,
    /// Amount of borrow shares held
    #[serde(with = "crate::bigint", default)]
    pub borrow_shares: U256,
    /// Amount of collateral assets held
    #[serde(with = "crate::bigint", default)]
    pub collateral: U256,
}

impl Position {
    /// Create a new position
    pub fn new(
        user: Address,
        market_id: MarketId,
        supply_shares: U256,
        borrow_shares: U256,
        collateral: U256,
    ) -> Self {
        Self {
            user,
            market_id,
            supply_shares,
            borrow_shares,
            collateral,
        }
    }

    /// Create an empty position
    pub fn empty(user: Address, market_id: MarketId) -> Self {
        Self::new(user, market_id, U256::ZERO, U256::ZERO, U256::ZERO)
    }

    /// Returns the supply assets for this position
    pub fn supply_assets(&self, market: &Market) -> Result<U256> {
        market.to_supply_assets(self.supply_shares, RoundingDirection::Down)
    }

    /// Supply assets to the position.
    ///
    /// Returns the updated position, the updated market and the shares minted.
    pub fn supply(&self, market: &Market, assets: U256) -> Result<(Position, Market, U256)> {
        let (new_market, shares) = market.supply(assets)?;

        let mut new_position = self.clone();
        new_position.supply_shares = math::checked_add(new_position.supply_shares, shares)?;

        Ok((new_position, new_market, shares))
    }

    /// Withdraw assets from the position.
    ///
    /// Returns the updated position, the updated market and the shares burned.
    pub fn withdraw(&self, market: &Market, assets: U256) -> Result<(Position, Market, U256)> {
        let (new_market, shares) = market.withdraw(assets)?;

        if shares > self.supply_shares {
            return Err(SimError::InsufficientPosition {
                user: self.user,
                market_id: self.market_id,
            });
        }

        let mut new_position = self.clone();
        new_position.supply_shares -= shares;

        Ok((new_position, new_market, shares))
    }
}
