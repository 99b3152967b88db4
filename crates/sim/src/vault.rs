//! MetaMorpho vault state and its public allocator configuration.
//!
//! A vault spreads its deposits across Morpho Blue markets. The public
//! allocator lets anyone move the vault's liquidity between those markets,
//! bounded per market by the remaining `max_in` / `max_out` flow budgets of
//! [`PublicAllocatorMarketConfig`], in exchange for a fixed native-currency fee.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{MarketId, Result, SimError};

/// Vault-level public allocator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAllocatorConfig {
    /// Admin allowed to change flow caps and the fee
    #[serde(default)]
    pub admin: Address,
    /// Fee to use public allocator (in native token)
    #[serde(with = "crate::bigint")]
    pub fee: U256,
    /// Accrued fees
    #[serde(with = "crate::bigint")]
    pub accrued_fee: U256,
}

/// Represents a MetaMorpho vault state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    /// The vault's address
    pub address: Address,
    /// Underlying asset
    pub asset: Address,
    /// Decimals offset between vault shares and the asset
    #[serde(default)]
    pub decimals_offset: u8,
    /// Performance fee (WAD-scaled)
    #[serde(with = "crate::bigint", default)]
    pub fee: U256,
    /// Vault owner
    #[serde(default)]
    pub owner: Address,
    /// Vault curator
    #[serde(default)]
    pub curator: Address,
    /// Total assets under management
    #[serde(with = "crate::bigint", default)]
    pub total_assets: U256,
    /// Total vault shares outstanding
    #[serde(with = "crate::bigint", default)]
    pub total_supply: U256,
    /// Last recorded total assets (for fee calculation)
    #[serde(with = "crate::bigint", default)]
    pub last_total_assets: U256,
    /// Ordered supply queue (markets to deposit into)
    #[serde(default)]
    pub supply_queue: Vec<MarketId>,
    /// Ordered withdraw queue (markets to withdraw from)
    #[serde(default)]
    pub withdraw_queue: Vec<MarketId>,
    /// Public allocator configuration
    #[serde(default)]
    pub public_allocator_config: Option<PublicAllocatorConfig>,
}

impl Vault {
    /// Returns the public allocator configuration or fails if the vault has none.
    pub fn public_allocator(&self) -> Result<&PublicAllocatorConfig> {
        self.public_allocator_config
            .as_ref()
            .ok_or(SimError::PublicAllocatorNotConfigured {
                vault: self.address,
            })
    }

    pub(crate) fn public_allocator_mut(&mut self) -> Result<&mut PublicAllocatorConfig> {
        let vault = self.address;
        self.public_allocator_config
            .as_mut()
            .ok_or(SimError::PublicAllocatorNotConfigured { vault })
    }
}

/// Public allocator configuration for a specific market
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicAllocatorMarketConfig {
    /// Remaining assets that can flow into this market
    #[serde(with = "crate::bigint")]
    pub max_in: U256,
    /// Remaining assets that can flow out of this market
    #[serde(with = "crate::bigint")]
    pub max_out: U256,
}

/// Configuration for a market within a vault
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultMarketConfig {
    /// The vault this config belongs to
    pub vault: Address,
    /// The market's unique identifier
    pub market_id: MarketId,
    /// Maximum supply cap for this market
    #[serde(with = "crate::bigint")]
    pub cap: U256,
    /// Whether this market is enabled
    pub enabled: bool,
    /// Timestamp at which the market can be removed, zero if not pending removal
    #[serde(default)]
    pub removable_at: u64,
    /// Pending cap increase, if any
    #[serde(with = "crate::bigint::option", default)]
    pub pending_cap: Option<U256>,
    /// Public allocator configuration (if any)
    #[serde(default)]
    pub public_allocator_config: Option<PublicAllocatorMarketConfig>,
}

impl VaultMarketConfig {
    /// Returns the public allocator flow caps for an enabled market.
    ///
    /// # Errors
    ///
    /// - [`SimError::MarketNotEnabled`] if the vault has not enabled the market
    /// - [`SimError::PublicAllocatorNotConfigured`] if no flow caps are set
    pub fn flow_caps(&self) -> Result<&PublicAllocatorMarketConfig> {
        if !self.enabled {
            return Err(SimError::MarketNotEnabled {
                vault: self.vault,
                market_id: self.market_id,
            });
        }

        self.public_allocator_config
            .as_ref()
            .ok_or(SimError::PublicAllocatorNotConfigured { vault: self.vault })
    }

    pub(crate) fn flow_caps_mut(&mut self) -> Result<&mut PublicAllocatorMarketConfig> {
        let vault = self.vault;
        self.public_allocator_config
            .as_mut()
            .ok_or(SimError::PublicAllocatorNotConfigured { vault })
    }
}
