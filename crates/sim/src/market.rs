//! Market state for Morpho Blue markets.
//!
//! A [`Market`] tracks aggregate supply and borrow totals. Positions are
//! accounted in shares; the ratio of total assets to total shares is the
//! market's exchange rate, offset by the virtual shares of [`crate::math`].
//!
//! The engine assumes interest has already been accrued up to the snapshot's
//! block, so [`Market::supply`] and [`Market::withdraw`] move totals without
//! touching rates.
//!
//! # Example
//!
//! ```rust
//! use morpho_rs_simulation::{Market, MarketParams};
//! use alloy_primitives::U256;
//!
//! let params = MarketParams::default();
//! let market = Market::new(
//!     params.id(),
//!     params,
//!     U256::from(1_000_000u64),            // supply assets
//!     U256::from(1_000_000_000_000u64),    // supply shares
//!     U256::from(500_000u64),              // borrow assets
//!     U256::from(500_000_000_000u64),      // borrow shares
//! );
//!
//! let (after, shares) = market.supply(U256::from(40u64)).unwrap();
//! assert_eq!(shares, U256::from(40_000_000u64));
//! assert_eq!(after.total_supply_assets, U256::from(1_000_040u64));
//! ```

use alloy_primitives::{keccak256, Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{MarketId, Result, SimError};
use crate::math::{self, RoundingDirection};

/// Immutable parameters a market is created with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParams {
    pub loan_token: Address,
    pub collateral_token: Address,
    pub oracle: Address,
    pub irm: Address,
    /// Liquidation LTV (WAD-scaled)
    #[serde(with = "crate::bigint")]
    pub lltv: U256,
}

impl MarketParams {
    /// Returns the market id: keccak256 of the ABI-encoded params.
    pub fn id(&self) -> MarketId {
        let mut encoded = [0u8; 160];
        encoded[12..32].copy_from_slice(self.loan_token.as_slice());
        encoded[44..64].copy_from_slice(self.collateral_token.as_slice());
        encoded[76..96].copy_from_slice(self.oracle.as_slice());
        encoded[108..128].copy_from_slice(self.irm.as_slice());
        encoded[128..160].copy_from_slice(&self.lltv.to_be_bytes::<32>());
        keccak256(encoded)
    }
}

/// Represents a lending market on Morpho Blue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    /// The market's unique identifier.
    ///
    /// Normally `params.id()`, but the stored value is authoritative: a
    /// snapshot may key markets by any 32-byte id and the engine never
    /// recomputes it from `params`.
    pub id: MarketId,

    pub params: MarketParams,

    /// The amount of loan assets supplied in total on the market
    #[serde(with = "crate::bigint")]
    pub total_supply_assets: U256,

    /// The total supply shares representing lender positions
    #[serde(with = "crate::bigint")]
    pub total_supply_shares: U256,

    /// The amount of loan assets borrowed in total from the market
    #[serde(with = "crate::bigint")]
    pub total_borrow_assets: U256,

    /// The total borrow shares representing borrower debt
    #[serde(with = "crate::bigint")]
    pub total_borrow_shares: U256,

    /// The block timestamp (in seconds) when interest was last accrued
    #[serde(default)]
    pub last_update: u64,

    /// The protocol fee percentage (WAD-scaled)
    #[serde(with = "crate::bigint", default)]
    pub fee: U256,

    /// Rate at target utilization, for markets using the Adaptive Curve IRM
    #[serde(with = "crate::bigint::option", default)]
    pub rate_at_target: Option<U256>,

    /// Oracle price (collateral/loan, scaled by 1e36)
    #[serde(with = "crate::bigint::option", default)]
    pub price: Option<U256>,
}

impl Market {
    /// Creates a market with the given totals and no rate or oracle data.
    pub fn new(
        id: MarketId,
        params: MarketParams,
        total_supply_assets: U256,
        total_supply_shares: U256,
        total_borrow_assets: U256,
        total_borrow_shares: U256,
    ) -> Self {
        Self {
            id,
            params,
            total_supply_assets,
            total_supply_shares,
            total_borrow_assets,
            total_borrow_shares,
            last_update: 0,
            fee: U256::ZERO,
            rate_at_target: None,
            price: None,
        }
    }

    /// Returns the market's current liquidity (supply - borrow)
    pub fn liquidity(&self) -> U256 {
        math::zero_floor_sub(self.total_supply_assets, self.total_borrow_assets)
    }

    /// Convert supply shares to assets
    pub fn to_supply_assets(&self, shares: U256, rounding: RoundingDirection) -> Result<U256> {
        math::to_assets(
            shares,
            self.total_supply_assets,
            self.total_supply_shares,
            rounding,
        )
    }

    /// Convert assets to supply shares
    pub fn to_supply_shares(&self, assets: U256, rounding: RoundingDirection) -> Result<U256> {
        math::to_shares(
            assets,
            self.total_supply_assets,
            self.total_supply_shares,
            rounding,
        )
    }

    /// Supplies assets to the market.
    ///
    /// Shares are minted rounding down so the supplier is never over-credited.
    /// Returns the updated market and the shares minted. The original market is
    /// unchanged.
    ///
    /// # Errors
    ///
    /// - [`SimError::ArithmeticOverflow`] if either total would exceed `U256`
    pub fn supply(&self, assets: U256) -> Result<(Market, U256)> {
        let shares = self.to_supply_shares(assets, RoundingDirection::Down)?;

        let mut market = self.clone();
        market.total_supply_assets = math::checked_add(market.total_supply_assets, assets)?;
        market.total_supply_shares = math::checked_add(market.total_supply_shares, shares)?;

        Ok((market, shares))
    }

    /// Withdraws assets from the market.
    ///
    /// Shares are burned rounding up. Returns the updated market and the shares
    /// burned.
    ///
    /// # Errors
    ///
    /// - [`SimError::InsufficientLiquidity`] if the withdrawal leaves borrows
    ///   above supply
    pub fn withdraw(&self, assets: U256) -> Result<(Market, U256)> {
        if assets > self.liquidity() {
            return Err(SimError::InsufficientLiquidity { market_id: self.id });
        }

        let shares = self.to_supply_shares(assets, RoundingDirection::Up)?;

        let mut market = self.clone();
        market.total_supply_assets -= assets;
        market.total_supply_shares = math::zero_floor_sub(market.total_supply_shares, shares);

        Ok((market, shares))
    }
}
