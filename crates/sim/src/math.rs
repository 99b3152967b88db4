//! Fixed-point math used by share accounting.
//!
//! All conversions are exact integer arithmetic over [`U256`] with a 512-bit
//! intermediate product, so `x * y` never overflows before the division.

use alloy_primitives::{U256, U512};

use crate::error::{Result, SimError};

/// Virtual shares added to a market's total supply shares (1e6)
pub const VIRTUAL_SHARES: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Virtual assets added to a market's total supply assets (1)
pub const VIRTUAL_ASSETS: U256 = U256::from_limbs([1, 0, 0, 0]);

/// Rounding direction of an integer division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundingDirection {
    Up,
    Down,
}

/// Computes `x * y / d` rounded in the given direction.
///
/// # Errors
///
/// - [`SimError::DivisionByZero`] if `d` is zero
/// - [`SimError::ArithmeticOverflow`] if the quotient does not fit in 256 bits
pub fn mul_div(x: U256, y: U256, d: U256, rounding: RoundingDirection) -> Result<U256> {
    if d.is_zero() {
        return Err(SimError::DivisionByZero);
    }

    let numerator = U512::from(x) * U512::from(y);
    let denominator = U512::from(d);

    let mut quotient = numerator / denominator;
    if rounding == RoundingDirection::Up && !(numerator % denominator).is_zero() {
        quotient += U512::from(1u8);
    }

    narrow(quotient)
}

fn narrow(value: U512) -> Result<U256> {
    let limbs = value.as_limbs();
    if limbs[4..].iter().any(|limb| *limb != 0) {
        return Err(SimError::ArithmeticOverflow);
    }
    Ok(U256::from_limbs([limbs[0], limbs[1], limbs[2], limbs[3]]))
}

/// Returns `a + b`, or [`SimError::ArithmeticOverflow`].
pub fn checked_add(a: U256, b: U256) -> Result<U256> {
    a.checked_add(b).ok_or(SimError::ArithmeticOverflow)
}

/// Converts assets to shares using the virtual-share offset.
pub fn to_shares(
    assets: U256,
    total_assets: U256,
    total_shares: U256,
    rounding: RoundingDirection,
) -> Result<U256> {
    mul_div(
        assets,
        checked_add(total_shares, VIRTUAL_SHARES)?,
        checked_add(total_assets, VIRTUAL_ASSETS)?,
        rounding,
    )
}

/// Converts shares to assets using the virtual-share offset.
pub fn to_assets(
    shares: U256,
    total_assets: U256,
    total_shares: U256,
    rounding: RoundingDirection,
) -> Result<U256> {
    mul_div(
        shares,
        checked_add(total_assets, VIRTUAL_ASSETS)?,
        checked_add(total_shares, VIRTUAL_SHARES)?,
        rounding,
    )
}

/// Returns `a - b`, or zero if `b > a`
pub fn zero_floor_sub(a: U256, b: U256) -> U256 {
    a.saturating_sub(b)
}
