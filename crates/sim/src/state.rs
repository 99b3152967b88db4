//! Immutable snapshot of the protocol state a simulation runs against.
//!
//! Every entity is stored behind an [`Arc`]. Cloning a [`SimulationState`]
//! copies map nodes and reference counts only; writes on the clone go through
//! [`Arc::make_mut`], which copies the single touched entity. The result is a
//! new snapshot that shares every untouched entity with its base, while the
//! base itself is never written.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::sync::Arc;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{MarketId, Result, SimError};
use crate::holding::Holding;
use crate::market::Market;
use crate::position::Position;
use crate::vault::{Vault, VaultMarketConfig};

/// Block the snapshot was taken at.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockInfo {
    pub number: u64,
    pub timestamp: u64,
}

/// All markets, vaults, positions, vault-market configs and holdings at one block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationState {
    pub chain_id: u64,
    #[serde(default)]
    pub block: BlockInfo,
    #[serde(default)]
    pub markets: BTreeMap<MarketId, Arc<Market>>,
    #[serde(default)]
    pub vaults: BTreeMap<Address, Arc<Vault>>,
    /// Positions keyed by user, then market
    #[serde(default)]
    pub positions: BTreeMap<Address, BTreeMap<MarketId, Arc<Position>>>,
    /// Vault-market configs keyed by vault, then market
    #[serde(default)]
    pub vault_market_configs: BTreeMap<Address, BTreeMap<MarketId, Arc<VaultMarketConfig>>>,
    /// Holdings keyed by owner, then token
    #[serde(default)]
    pub holdings: BTreeMap<Address, BTreeMap<Address, Arc<Holding>>>,
}

impl SimulationState {
    /// Create an empty snapshot
    pub fn new(chain_id: u64, block: BlockInfo) -> Self {
        Self {
            chain_id,
            block,
            ..Self::default()
        }
    }

    // ==================== Population ====================

    pub fn insert_market(&mut self, market: Market) {
        self.markets.insert(market.id, Arc::new(market));
    }

    pub fn insert_vault(&mut self, vault: Vault) {
        self.vaults.insert(vault.address, Arc::new(vault));
    }

    pub fn insert_position(&mut self, position: Position) {
        self.positions
            .entry(position.user)
            .or_default()
            .insert(position.market_id, Arc::new(position));
    }

    pub fn insert_vault_market_config(&mut self, config: VaultMarketConfig) {
        self.vault_market_configs
            .entry(config.vault)
            .or_default()
            .insert(config.market_id, Arc::new(config));
    }

    pub fn insert_holding(&mut self, holding: Holding) {
        self.holdings
            .entry(holding.user)
            .or_default()
            .insert(holding.token, Arc::new(holding));
    }

    // ==================== Reads ====================

    pub fn get_market(&self, market_id: MarketId) -> Result<&Market> {
        self.markets
            .get(&market_id)
            .map(AsRef::as_ref)
            .ok_or(SimError::UnknownMarket { market_id })
    }

    pub fn get_vault(&self, vault: Address) -> Result<&Vault> {
        self.vaults
            .get(&vault)
            .map(AsRef::as_ref)
            .ok_or(SimError::UnknownVault { vault })
    }

    pub fn get_position(&self, user: Address, market_id: MarketId) -> Result<&Position> {
        self.positions
            .get(&user)
            .and_then(|positions| positions.get(&market_id))
            .map(AsRef::as_ref)
            .ok_or(SimError::UnknownPosition { user, market_id })
    }

    pub fn get_vault_market_config(
        &self,
        vault: Address,
        market_id: MarketId,
    ) -> Result<&VaultMarketConfig> {
        self.vault_market_configs
            .get(&vault)
            .and_then(|configs| configs.get(&market_id))
            .map(AsRef::as_ref)
            .ok_or(SimError::UnknownVaultMarketConfig { vault, market_id })
    }

    pub fn get_holding(&self, user: Address, token: Address) -> Result<&Holding> {
        self.holdings
            .get(&user)
            .and_then(|holdings| holdings.get(&token))
            .map(AsRef::as_ref)
            .ok_or(SimError::UnknownHolding { user, token })
    }

    // ==================== Copy-on-write ====================

    pub(crate) fn vault_mut(&mut self, vault: Address) -> Result<&mut Vault> {
        self.vaults
            .get_mut(&vault)
            .map(Arc::make_mut)
            .ok_or(SimError::UnknownVault { vault })
    }

    pub(crate) fn vault_market_config_mut(
        &mut self,
        vault: Address,
        market_id: MarketId,
    ) -> Result<&mut VaultMarketConfig> {
        self.vault_market_configs
            .get_mut(&vault)
            .and_then(|configs| configs.get_mut(&market_id))
            .map(Arc::make_mut)
            .ok_or(SimError::UnknownVaultMarketConfig { vault, market_id })
    }

    pub(crate) fn holding_mut(&mut self, user: Address, token: Address) -> Result<&mut Holding> {
        self.holdings
            .get_mut(&user)
            .and_then(|holdings| holdings.get_mut(&token))
            .map(Arc::make_mut)
            .ok_or(SimError::UnknownHolding { user, token })
    }

    // ==================== Diff ====================

    /// Lists every field whose value differs between `self` and `other`.
    ///
    /// Changes are ordered by entity kind, then key, then field path. Entities
    /// shared between the two snapshots are skipped without being compared.
    pub fn diff(&self, other: &SimulationState) -> Vec<StateChange> {
        let mut changes = Vec::new();

        diff_entities(EntityKind::Market, &self.markets, &other.markets, &mut changes);
        diff_entities(EntityKind::Vault, &self.vaults, &other.vaults, &mut changes);
        diff_nested_entities(EntityKind::Position, &self.positions, &other.positions, &mut changes);
        diff_nested_entities(
            EntityKind::VaultMarketConfig,
            &self.vault_market_configs,
            &other.vault_market_configs,
            &mut changes,
        );
        diff_nested_entities(EntityKind::Holding, &self.holdings, &other.holdings, &mut changes);

        changes
    }
}

/// Kind of entity a [`StateChange`] applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Market,
    Vault,
    Position,
    VaultMarketConfig,
    Holding,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Market => "market",
            Self::Vault => "vault",
            Self::Position => "position",
            Self::VaultMarketConfig => "vault_market_config",
            Self::Holding => "holding",
        };
        f.write_str(name)
    }
}

/// A single field that differs between two snapshots.
///
/// `before` is `None` for entities only present after, `after` is `None` for
/// entities only present before.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity: EntityKind,
    /// Entity key; nested keys are joined with `/`
    pub key: String,
    /// Dotted path of the field inside the entity
    pub field: String,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

fn diff_entities<K, V>(
    entity: EntityKind,
    before: &BTreeMap<K, Arc<V>>,
    after: &BTreeMap<K, Arc<V>>,
    changes: &mut Vec<StateChange>,
) where
    K: Ord + Display,
    V: Serialize + PartialEq,
{
    let keys: std::collections::BTreeSet<&K> = before.keys().chain(after.keys()).collect();

    for key in keys {
        diff_entity(
            entity,
            key.to_string(),
            before.get(key),
            after.get(key),
            changes,
        );
    }
}

fn diff_nested_entities<K1, K2, V>(
    entity: EntityKind,
    before: &BTreeMap<K1, BTreeMap<K2, Arc<V>>>,
    after: &BTreeMap<K1, BTreeMap<K2, Arc<V>>>,
    changes: &mut Vec<StateChange>,
) where
    K1: Ord + Display,
    K2: Ord + Display,
    V: Serialize + PartialEq,
{
    let empty = BTreeMap::new();
    let outer: std::collections::BTreeSet<&K1> = before.keys().chain(after.keys()).collect();

    for outer_key in outer {
        let inner_before = before.get(outer_key).unwrap_or(&empty);
        let inner_after = after.get(outer_key).unwrap_or(&empty);
        let inner: std::collections::BTreeSet<&K2> =
            inner_before.keys().chain(inner_after.keys()).collect();

        for inner_key in inner {
            diff_entity(
                entity,
                format!("{outer_key}/{inner_key}"),
                inner_before.get(inner_key),
                inner_after.get(inner_key),
                changes,
            );
        }
    }
}

fn diff_entity<V: Serialize + PartialEq>(
    entity: EntityKind,
    key: String,
    before: Option<&Arc<V>>,
    after: Option<&Arc<V>>,
    changes: &mut Vec<StateChange>,
) {
    if let (Some(before), Some(after)) = (before, after) {
        if Arc::ptr_eq(before, after) || before == after {
            return;
        }
    }

    let before = before.map(|value| flatten(value.as_ref())).unwrap_or_default();
    let after = after.map(|value| flatten(value.as_ref())).unwrap_or_default();
    let fields: std::collections::BTreeSet<&String> = before.keys().chain(after.keys()).collect();

    for field in fields {
        let old = before.get(field);
        let new = after.get(field);
        if old != new {
            changes.push(StateChange {
                entity,
                key: key.clone(),
                field: field.clone(),
                before: old.cloned(),
                after: new.cloned(),
            });
        }
    }
}

fn flatten<V: Serialize>(value: &V) -> BTreeMap<String, Value> {
    let mut fields = BTreeMap::new();
    flatten_into(String::new(), serde_json::to_value(value).unwrap_or(Value::Null), &mut fields);
    fields
}

fn flatten_into(prefix: String, value: Value, fields: &mut BTreeMap<String, Value>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (name, inner) in map {
                let path = if prefix.is_empty() {
                    name
                } else {
                    format!("{prefix}.{name}")
                };
                flatten_into(path, inner, fields);
            }
        }
        leaf => {
            fields.insert(prefix, leaf);
        }
    }
}
