//! Public reallocation of a vault's liquidity through the public allocator.
//!
//! The handler withdraws from each listed market in order, supplies the total
//! into the supply market, moves the flow caps of every touched market, charges
//! the fixed fee to the sender and consumes the vault's allowance to Morpho.
//!
//! All steps run on a draft clone of the base snapshot. Each step reads the
//! draft, so a market listed twice (or both withdrawn from and supplied to) is
//! accounted sequentially. The draft is only returned once every check passed;
//! on failure it is dropped and the base snapshot is left as it was.

use alloy_primitives::{Address, U256};
use tracing::{debug, trace};

use crate::constraints::{check_inflow, check_outflow};
use crate::error::{MarketId, Result, SimError};
use crate::holding::NATIVE_ADDRESS;
use crate::math;
use crate::operation::{PublicReallocateArgs, Withdrawal};
use crate::position::Position;
use crate::state::SimulationState;

/// Simulates `MetaMorpho_PublicReallocate` sent by `sender` against `vault`.
///
/// # Errors
///
/// - [`SimError::CapExceeded`] if a withdrawal exceeds its market's
///   `max_out`, or the total exceeds the supply market's `max_in`
/// - [`SimError::InsufficientLiquidity`] /
///   [`SimError::InsufficientPosition`] if a withdrawal cannot be served
/// - [`SimError::UnauthorizedMarket`] if the supply market has a zero cap
/// - [`SimError::SupplyCapExceeded`] if the vault's supply would exceed the
///   supply market's cap
/// - [`SimError::InsufficientBalance`] if the sender cannot pay the fee
/// - [`SimError::InsufficientAllowance`] if the vault's allowance to
///   Morpho does not cover the supplied total
/// - [`SimError::MarketNotEnabled`] /
///   [`SimError::PublicAllocatorNotConfigured`] for vault misconfiguration
/// - [`SimError::ArithmeticOverflow`] if a total would exceed `U256`
/// - `Unknown*` variants if the snapshot lacks a referenced entity
pub fn handle_public_reallocate(
    sender: Address,
    vault: Address,
    args: &PublicReallocateArgs,
    state: &SimulationState,
) -> Result<SimulationState> {
    let fee = state.get_vault(vault)?.public_allocator()?.fee;

    debug!(
        %sender,
        %vault,
        withdrawals = args.withdrawals.len(),
        supply_market = %args.supply_market_id,
        "simulating public reallocation"
    );

    let mut draft = state.clone();

    for withdrawal in &args.withdrawals {
        withdraw(&mut draft, vault, withdrawal)?;
    }

    let total_withdrawn = args.total_withdrawn()?;
    let loan_token = supply(&mut draft, vault, args.supply_market_id, total_withdrawn)?;

    if !fee.is_zero() {
        draft.holding_mut(sender, NATIVE_ADDRESS)?.debit(fee)?;

        let config = draft.vault_mut(vault)?.public_allocator_mut()?;
        config.accrued_fee = math::checked_add(config.accrued_fee, fee)?;
    }

    // The vault re-supplies through Morpho, spending its allowance
    if let Some(loan_token) = loan_token {
        draft
            .holding_mut(vault, loan_token)?
            .spend_morpho_allowance(total_withdrawn)?;
    }

    debug!(%vault, %total_withdrawn, %fee, "public reallocation simulated");

    Ok(draft)
}

fn withdraw(draft: &mut SimulationState, vault: Address, withdrawal: &Withdrawal) -> Result<()> {
    let Withdrawal { id, assets } = *withdrawal;

    let caps = draft.get_vault_market_config(vault, id)?.flow_caps()?;
    check_outflow(vault, id, assets, caps)?;

    let market = draft.get_market(id)?;
    let position = draft.get_position(vault, id)?;
    let (position, market, shares) = position.withdraw(market, assets)?;

    trace!(market = %id, %assets, %shares, "withdrawn");

    draft.insert_market(market);
    draft.insert_position(position);

    let caps = draft.vault_market_config_mut(vault, id)?.flow_caps_mut()?;
    caps.max_in = math::checked_add(caps.max_in, assets)?;
    caps.max_out -= assets;

    Ok(())
}

/// Supplies `assets` into `market_id`, returning the market's loan token when
/// anything moved.
fn supply(
    draft: &mut SimulationState,
    vault: Address,
    market_id: MarketId,
    assets: U256,
) -> Result<Option<Address>> {
    let config = draft.get_vault_market_config(vault, market_id)?;
    check_inflow(vault, market_id, assets, config.flow_caps()?)?;

    // Nothing flows: markets, positions and caps stay as they are
    if assets.is_zero() {
        return Ok(None);
    }

    let cap = config.cap;
    if cap.is_zero() {
        return Err(SimError::UnauthorizedMarket { vault, market_id });
    }

    let market = draft.get_market(market_id)?;
    let loan_token = market.params.loan_token;
    let position = draft
        .get_position(vault, market_id)
        .ok()
        .cloned()
        .unwrap_or_else(|| Position::empty(vault, market_id));
    let (position, market, shares) = position.supply(market, assets)?;

    let supplied = position.supply_assets(&market)?;
    if supplied > cap {
        return Err(SimError::SupplyCapExceeded {
            vault,
            market_id,
            cap,
            supply: supplied,
        });
    }

    trace!(market = %market_id, %assets, %shares, "supplied");

    draft.insert_market(market);
    draft.insert_position(position);

    let caps = draft.vault_market_config_mut(vault, market_id)?.flow_caps_mut()?;
    caps.max_in -= assets;
    caps.max_out = math::checked_add(caps.max_out, assets)?;

    Ok(Some(loan_token))
}
