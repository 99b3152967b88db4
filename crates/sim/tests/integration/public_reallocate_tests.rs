//! End-to-end simulations of `MetaMorpho_PublicReallocate` against the shared
//! fixture snapshot.

use alloy_primitives::U256;
use morpho_rs_simulation::{
    simulate_json_operation, simulate_operation, EntityKind, FlowDirection, MarketId, Operation, SimError,
    SimulationState, Withdrawal, NATIVE_ADDRESS,
};
use serde_json::json;

use super::common::*;

fn reallocate(withdrawals: &[(MarketId, u64)], supply_market_id: MarketId) -> Operation {
    Operation::public_reallocate(
        USER_B,
        VAULT_A,
        withdrawals
            .iter()
            .map(|(id, amount)| Withdrawal {
                id: *id,
                assets: units(*amount),
            })
            .collect(),
        supply_market_id,
    )
}

/// Applies the expected effects of moving 40 units from A1 to A2.
fn expected_after_reallocation(data: &SimulationState) -> Option<SimulationState> {
    let mut expected = data.clone();
    let amount = units(40);

    let market = entity_mut(expected.markets.get_mut(&MARKET_A1)?);
    market.total_supply_assets -= amount;
    market.total_supply_shares -= shares(40);

    let market = entity_mut(expected.markets.get_mut(&MARKET_A2)?);
    market.total_supply_assets += amount;
    market.total_supply_shares += shares(40);

    let positions = expected.positions.get_mut(&VAULT_A)?;
    entity_mut(positions.get_mut(&MARKET_A1)?).supply_shares -= shares(40);
    entity_mut(positions.get_mut(&MARKET_A2)?).supply_shares += shares(40);

    let configs = expected.vault_market_configs.get_mut(&VAULT_A)?;
    let caps = entity_mut(configs.get_mut(&MARKET_A1)?)
        .public_allocator_config
        .as_mut()?;
    caps.max_in += amount;
    caps.max_out -= amount;
    let caps = entity_mut(configs.get_mut(&MARKET_A2)?)
        .public_allocator_config
        .as_mut()?;
    caps.max_in -= amount;
    caps.max_out += amount;

    let fee = U256::from(PUBLIC_ALLOCATOR_FEE);
    let holdings = expected.holdings.get_mut(&USER_B)?;
    entity_mut(holdings.get_mut(&NATIVE_ADDRESS)?).balance -= fee;

    let vault_holding = expected.holdings.get_mut(&VAULT_A)?;
    entity_mut(vault_holding.get_mut(&TOKEN_A)?)
        .erc20_allowances
        .morpho -= amount;

    entity_mut(expected.vaults.get_mut(&VAULT_A)?)
        .public_allocator_config
        .as_mut()?
        .accrued_fee += fee;

    Some(expected)
}

/// Flow caps of a vault-market pair as `(max_in, max_out)`
fn flow_caps(state: &SimulationState, market_id: MarketId) -> Option<(U256, U256)> {
    let caps = state
        .get_vault_market_config(VAULT_A, market_id)
        .ok()?
        .flow_caps()
        .ok()?;
    Some((caps.max_in, caps.max_out))
}

fn total_supplied(state: &SimulationState) -> U256 {
    state
        .markets
        .values()
        .fold(U256::ZERO, |total, market| total + market.total_supply_assets)
}

#[test]
fn test_public_reallocate() {
    let data = data_fixture();

    let result = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap();

    assert_eq!(Some(result), expected_after_reallocation(&data));
}

#[test]
fn test_public_reallocate_from_json() {
    let data = data_fixture();
    let operation = json!({
        "type": "MetaMorpho_PublicReallocate",
        "sender": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
        "address": "0x000000000000000000000000000000000000000a",
        "args": {
            "withdrawals": [
                { "id": "0x042487b563685b432d4d2341934985eca3993647799cb5468fb366fad26b4fdd", "assets": "40000000n" }
            ],
            "supplyMarketId": "0x82b7572458381128c105a67bc944e36b6318aa3c8095074efe9da6274b8e236a"
        }
    });

    let result = simulate_json_operation(&operation, &data).unwrap();

    assert_eq!(Some(result), expected_after_reallocation(&data));
}

#[test]
fn test_input_snapshot_is_unchanged() {
    let data = data_fixture();
    let before = data.clone();

    simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap();
    let _ = simulate_operation(&reallocate(&[(MARKET_A2, 10)], MARKET_A1), &data);

    assert_eq!(data, before);
}

#[test]
fn test_simulation_is_deterministic() {
    let data = data_fixture();
    let operation = reallocate(&[(MARKET_A1, 40)], MARKET_A2);

    let first = simulate_operation(&operation, &data).unwrap();
    let second = simulate_operation(&operation, &data).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_max_outflow_exceeded() {
    let data = data_fixture();

    let error = simulate_operation(&reallocate(&[(MARKET_A2, 10)], MARKET_A1), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::CapExceeded {
            direction: FlowDirection::Outflow,
            vault: VAULT_A,
            market_id: MARKET_A2,
            requested: units(10),
            remaining: units(5),
        }
    );
    assert_eq!(
        error.to_string(),
        r#"max outflow exceeded for vault "0x000000000000000000000000000000000000000A" on market "0x82b7572458381128c105a67bc944e36b6318aa3c8095074efe9da6274b8e236a"

when simulating operation:
{
  "type": "MetaMorpho_PublicReallocate",
  "sender": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
  "address": "0x000000000000000000000000000000000000000A",
  "args": {
    "withdrawals": [
      {
        "id": "0x82b7572458381128c105a67bc944e36b6318aa3c8095074efe9da6274b8e236a",
        "assets": "10000000n"
      }
    ],
    "supplyMarketId": "0x042487b563685b432d4d2341934985eca3993647799cb5468fb366fad26b4fdd"
  }
}"#
    );
}

#[test]
fn test_max_inflow_exceeded() {
    let data = data_fixture();

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 50)], MARKET_A2), &data).unwrap_err();

    assert!(matches!(
        error.kind(),
        SimError::CapExceeded {
            direction: FlowDirection::Inflow,
            market_id,
            ..
        } if *market_id == MARKET_A2
    ));
    assert_eq!(
        error.to_string(),
        r#"max inflow exceeded for vault "0x000000000000000000000000000000000000000A" on market "0x82b7572458381128c105a67bc944e36b6318aa3c8095074efe9da6274b8e236a"

when simulating operation:
{
  "type": "MetaMorpho_PublicReallocate",
  "sender": "0xbBbBBBBbbBBBbbbBbbBbbbbBBbBbbbbBbBbbBBbB",
  "address": "0x000000000000000000000000000000000000000A",
  "args": {
    "withdrawals": [
      {
        "id": "0x042487b563685b432d4d2341934985eca3993647799cb5468fb366fad26b4fdd",
        "assets": "50000000n"
      }
    ],
    "supplyMarketId": "0x82b7572458381128c105a67bc944e36b6318aa3c8095074efe9da6274b8e236a"
  }
}"#
    );
}

#[test]
fn test_withdrawals_are_summed_against_inflow_cap() {
    let data = data_fixture();

    // 30 + 20 stays within A1's max_out but exceeds A2's max_in of 45
    let error = simulate_operation(
        &reallocate(&[(MARKET_A1, 30), (MARKET_A1, 20)], MARKET_A2),
        &data,
    )
    .unwrap_err();

    assert!(matches!(
        error.kind(),
        SimError::CapExceeded {
            direction: FlowDirection::Inflow,
            requested,
            ..
        } if *requested == units(50)
    ));
}

#[test]
fn test_repeated_withdrawals_consume_max_out() {
    let data = data_fixture();

    let error = simulate_operation(
        &reallocate(&[(MARKET_A2, 3), (MARKET_A2, 3)], MARKET_A1),
        &data,
    )
    .unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::CapExceeded {
            direction: FlowDirection::Outflow,
            vault: VAULT_A,
            market_id: MARKET_A2,
            requested: units(3),
            remaining: units(2),
        }
    );
}

#[test]
fn test_insufficient_fee_balance() {
    let mut data = data_fixture();
    let holdings = data.holdings.get_mut(&USER_B).unwrap();
    entity_mut(holdings.get_mut(&NATIVE_ADDRESS).unwrap()).balance = U256::from(1);

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert!(matches!(error.kind(), SimError::InsufficientBalance { user, .. } if *user == USER_B));
}

#[test]
fn test_insufficient_allowance() {
    let mut data = data_fixture();
    let holdings = data.holdings.get_mut(&VAULT_A).unwrap();
    entity_mut(holdings.get_mut(&TOKEN_A).unwrap()).erc20_allowances.morpho = units(39);

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::InsufficientAllowance {
            user: VAULT_A,
            token: TOKEN_A,
            allowance: units(39),
            required: units(40),
        }
    );
}

#[test]
fn test_insufficient_liquidity() {
    let mut data = data_fixture();
    // Borrow everything but 10 units out of A1
    let market = entity_mut(data.markets.get_mut(&MARKET_A1).unwrap());
    market.total_borrow_assets = units(9_990);

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::InsufficientLiquidity {
            market_id: MARKET_A1
        }
    );
}

#[test]
fn test_insufficient_position() {
    let mut data = data_fixture();
    let positions = data.positions.get_mut(&VAULT_A).unwrap();
    entity_mut(positions.get_mut(&MARKET_A1).unwrap()).supply_shares = shares(20);

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::InsufficientPosition {
            user: VAULT_A,
            market_id: MARKET_A1
        }
    );
}

#[test]
fn test_unknown_vault() {
    let data = data_fixture();
    let operation = Operation::public_reallocate(USER_B, USER_B, vec![], MARKET_A1);

    let error = simulate_operation(&operation, &data).unwrap_err();

    assert_eq!(error.kind(), &SimError::UnknownVault { vault: USER_B });
}

#[test]
fn test_unknown_operation_type() {
    let data = data_fixture();
    let mut operation = reallocate(&[(MARKET_A1, 40)], MARKET_A2).to_json();
    operation["type"] = json!("Blue_Borrow");

    let error = simulate_json_operation(&operation, &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::UnknownOperationType {
            operation_type: "Blue_Borrow".to_string()
        }
    );
    assert!(error.to_string().contains("\"type\": \"Blue_Borrow\""));
}

#[test]
fn test_empty_withdrawals_only_charge_fee() {
    let data = data_fixture();

    let result = simulate_operation(&reallocate(&[], MARKET_A2), &data).unwrap();

    let entities: Vec<EntityKind> = data.diff(&result).iter().map(|change| change.entity).collect();
    assert_eq!(entities, vec![EntityKind::Vault, EntityKind::Holding]);
    assert_eq!(
        result.get_holding(USER_B, NATIVE_ADDRESS).unwrap().balance,
        ether(1) - U256::from(PUBLIC_ALLOCATOR_FEE)
    );
}

#[test]
fn test_diff_of_reallocation() {
    let data = data_fixture();

    let result = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap();
    let changes = data.diff(&result);

    let caps = changes
        .iter()
        .find(|change| {
            change.entity == EntityKind::VaultMarketConfig
                && change.key.ends_with(&MARKET_A2.to_string())
                && change.field == "public_allocator_config.max_in"
        })
        .unwrap();
    assert_eq!(caps.before, Some(json!("45000000n")));
    assert_eq!(caps.after, Some(json!("5000000n")));

    // Untouched holdings of the sender are shared, not reported
    assert!(!changes
        .iter()
        .any(|change| change.entity == EntityKind::Holding
            && change.key.ends_with(&TOKEN_A.to_string())
            && change.key.starts_with(&USER_B.to_string())));
}

#[test]
fn test_reallocate_from_two_markets() {
    let data = data_fixture();
    let market_a3 = market_a3();

    let result = simulate_operation(
        &reallocate(&[(MARKET_A1, 20), (market_a3, 20)], MARKET_A2),
        &data,
    )
    .unwrap();

    assert_eq!(total_supplied(&result), total_supplied(&data));

    let positions = &result.positions[&VAULT_A];
    assert_eq!(positions[&MARKET_A1].supply_shares, shares(980));
    assert_eq!(positions[&market_a3].supply_shares, shares(280));
    assert_eq!(positions[&MARKET_A2].supply_shares, shares(440));

    assert_eq!(flow_caps(&result, MARKET_A1), Some((units(120), units(80))));
    assert_eq!(flow_caps(&result, market_a3), Some((units(80), units(10))));
    assert_eq!(flow_caps(&result, MARKET_A2), Some((units(5), units(45))));

    // One fee for the whole operation
    let fee = U256::from(PUBLIC_ALLOCATOR_FEE);
    assert_eq!(
        result.get_vault(VAULT_A).unwrap().public_allocator().unwrap().accrued_fee,
        fee
    );
    assert_eq!(
        result.get_holding(USER_B, NATIVE_ADDRESS).unwrap().balance,
        ether(1) - fee
    );
    assert_eq!(
        result.get_holding(VAULT_A, TOKEN_A).unwrap().erc20_allowances.morpho,
        units(1_000_000) - units(40)
    );
}

#[test]
fn test_supply_cap_exceeded() {
    let mut data = data_fixture();
    let configs = data.vault_market_configs.get_mut(&VAULT_A).unwrap();
    entity_mut(configs.get_mut(&MARKET_A2).unwrap()).cap = units(400);

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::SupplyCapExceeded {
            vault: VAULT_A,
            market_id: MARKET_A2,
            cap: units(400),
            supply: units(440),
        }
    );
}

#[test]
fn test_zero_cap_market_is_unauthorized() {
    let mut data = data_fixture();
    let configs = data.vault_market_configs.get_mut(&VAULT_A).unwrap();
    entity_mut(configs.get_mut(&MARKET_A2).unwrap()).cap = U256::ZERO;

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert_eq!(
        error.kind(),
        &SimError::UnauthorizedMarket {
            vault: VAULT_A,
            market_id: MARKET_A2,
        }
    );
}

#[test]
fn test_fee_failure_is_reported_before_allowance() {
    let mut data = data_fixture();
    let holdings = data.holdings.get_mut(&USER_B).unwrap();
    entity_mut(holdings.get_mut(&NATIVE_ADDRESS).unwrap()).balance = U256::ZERO;
    let holdings = data.holdings.get_mut(&VAULT_A).unwrap();
    entity_mut(holdings.get_mut(&TOKEN_A).unwrap()).erc20_allowances.morpho = U256::ZERO;

    let error = simulate_operation(&reallocate(&[(MARKET_A1, 40)], MARKET_A2), &data).unwrap_err();

    assert!(matches!(error.kind(), SimError::InsufficientBalance { user, .. } if *user == USER_B));
}

#[test]
fn test_stored_market_id_is_authoritative() {
    let data = data_fixture();
    let derived = data.get_market(MARKET_A1).unwrap().params.id();
    assert_ne!(derived, MARKET_A1);

    assert!(simulate_operation(&reallocate(&[(MARKET_A1, 10)], MARKET_A2), &data).is_ok());

    let error = simulate_operation(&reallocate(&[(derived, 10)], MARKET_A2), &data).unwrap_err();
    assert!(matches!(error.kind(), SimError::UnknownVaultMarketConfig { .. }));
}
