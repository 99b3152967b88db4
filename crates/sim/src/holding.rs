//! Token holdings and ERC20 allowances.

use alloy_primitives::{address, Address, U256};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

/// Sentinel token address standing for the chain's native currency.
pub const NATIVE_ADDRESS: Address = address!("EeeeeEeeeEeEeeEeEeEeeEEEeeeeEeeeeeeeEEeE");

/// Allowances granted by a holder, per spender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Allowances {
    #[serde(with = "crate::bigint", default)]
    pub morpho: U256,
    #[serde(with = "crate::bigint", default)]
    pub permit2: U256,
    #[serde(with = "crate::bigint", default)]
    pub general_adapter1: U256,
}

/// A user's balance of one token, with the allowances it granted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub user: Address,
    pub token: Address,
    #[serde(with = "crate::bigint")]
    pub balance: U256,
    #[serde(default)]
    pub erc20_allowances: Erc20Allowances,
}

impl Holding {
    pub fn new(user: Address, token: Address, balance: U256) -> Self {
        Self {
            user,
            token,
            balance,
            erc20_allowances: Erc20Allowances::default(),
        }
    }

    /// Debits `amount` from the balance.
    ///
    /// # Errors
    ///
    /// - [`SimError::InsufficientBalance`] if the balance is below `amount`
    pub fn debit(&mut self, amount: U256) -> Result<()> {
        if self.balance < amount {
            return Err(SimError::InsufficientBalance {
                user: self.user,
                token: self.token,
                balance: self.balance,
                required: amount,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Consumes `amount` of the allowance granted to Morpho.
    ///
    /// # Errors
    ///
    /// - [`SimError::InsufficientAllowance`] if the allowance is below `amount`
    pub fn spend_morpho_allowance(&mut self, amount: U256) -> Result<()> {
        let allowance = self.erc20_allowances.morpho;
        if allowance < amount {
            return Err(SimError::InsufficientAllowance {
                user: self.user,
                token: self.token,
                allowance,
                required: amount,
            });
        }
        self.erc20_allowances.morpho -= amount;
        Ok(())
    }
}
