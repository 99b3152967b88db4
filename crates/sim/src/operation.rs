//! Typed operations the engine can simulate.
//!
//! An [`Operation`] is an envelope (sender, target address) around a closed
//! [`OperationArgs`] enum; every variant has exactly one handler, selected by
//! an exhaustive `match` in [`crate::simulate`].
//!
//! The canonical JSON form mirrors what callers log and replay:
//!
//! ```json
//! {
//!   "type": "MetaMorpho_PublicReallocate",
//!   "sender": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
//!   "address": "0x000000000000000000000000000000000000000A",
//!   "args": {
//!     "withdrawals": [{ "id": "0x0424…", "assets": "40000000n" }],
//!     "supplyMarketId": "0x82b7…"
//!   }
//! }
//! ```

use alloy_primitives::{Address, U256};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::error::{MarketId, Result, SimError};
use crate::math;

/// Type tag of [`OperationArgs::MetaMorphoPublicReallocate`]
pub const METAMORPHO_PUBLIC_REALLOCATE: &str = "MetaMorpho_PublicReallocate";

/// One market to withdraw from during a public reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawal {
    pub id: MarketId,
    #[serde(with = "crate::bigint")]
    pub assets: U256,
}

/// Arguments of a public reallocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicReallocateArgs {
    /// Markets to withdraw from, processed in the given order
    pub withdrawals: Vec<Withdrawal>,
    /// Market receiving the sum of all withdrawals
    pub supply_market_id: MarketId,
}

impl PublicReallocateArgs {
    /// Sum of all withdrawn assets.
    ///
    /// # Errors
    ///
    /// - [`SimError::ArithmeticOverflow`] if the sum exceeds `U256`
    pub fn total_withdrawn(&self) -> Result<U256> {
        self.withdrawals
            .iter()
            .try_fold(U256::ZERO, |total, withdrawal| math::checked_add(total, withdrawal.assets))
    }
}

/// Tag-specific payload of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationArgs {
    MetaMorphoPublicReallocate(PublicReallocateArgs),
}

impl OperationArgs {
    /// Returns the operation's type tag
    pub fn operation_type(&self) -> &'static str {
        match self {
            Self::MetaMorphoPublicReallocate(_) => METAMORPHO_PUBLIC_REALLOCATE,
        }
    }
}

/// A single operation, as submitted by `sender` against the contract at `address`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub sender: Address,
    /// Contract or vault acted on
    pub address: Address,
    pub args: OperationArgs,
}

impl Operation {
    pub fn new(sender: Address, address: Address, args: OperationArgs) -> Self {
        Self {
            sender,
            address,
            args,
        }
    }

    /// Builds a public reallocation operation against `vault`.
    pub fn public_reallocate(
        sender: Address,
        vault: Address,
        withdrawals: Vec<Withdrawal>,
        supply_market_id: MarketId,
    ) -> Self {
        Self::new(
            sender,
            vault,
            OperationArgs::MetaMorphoPublicReallocate(PublicReallocateArgs {
                withdrawals,
                supply_market_id,
            }),
        )
    }

    /// Returns the operation's type tag
    pub fn operation_type(&self) -> &'static str {
        self.args.operation_type()
    }

    /// Returns the canonical JSON form of the operation.
    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Parses an operation from its canonical JSON form.
    ///
    /// # Errors
    ///
    /// - [`SimError::UnknownOperationType`] if the `type` tag names no operation
    /// - [`SimError::MalformedOperation`] if the envelope or payload is invalid
    pub fn from_json(value: &Value) -> Result<Self> {
        let operation_type = value
            .get("type")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("missing string field `type`"))?;

        // The tag is resolved before the envelope, so an unknown type is
        // reported as such even when the rest of the object is invalid
        let parse_args: fn(Value) -> Result<OperationArgs> = match operation_type {
            METAMORPHO_PUBLIC_REALLOCATE => |args: Value| {
                serde_json::from_value(args)
                    .map(OperationArgs::MetaMorphoPublicReallocate)
                    .map_err(malformed)
            },
            other => {
                return Err(SimError::UnknownOperationType {
                    operation_type: other.to_string(),
                })
            }
        };

        let envelope: Envelope = serde_json::from_value(value.clone()).map_err(malformed)?;
        let args = parse_args(envelope.args)?;

        Ok(Self::new(envelope.sender, envelope.address, args))
    }
}

#[derive(Deserialize)]
struct Envelope {
    sender: Address,
    address: Address,
    #[serde(default)]
    args: Value,
}

fn malformed(reason: impl std::fmt::Display) -> SimError {
    SimError::MalformedOperation {
        reason: reason.to_string(),
    }
}

impl Serialize for Operation {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(4))?;
        map.serialize_entry("type", self.operation_type())?;
        // Display renders EIP-55 checksummed addresses
        map.serialize_entry("sender", &self.sender.to_string())?;
        map.serialize_entry("address", &self.address.to_string())?;
        match &self.args {
            OperationArgs::MetaMorphoPublicReallocate(args) => map.serialize_entry("args", args)?,
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Operation {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_json(&value).map_err(serde::de::Error::custom)
    }
}
