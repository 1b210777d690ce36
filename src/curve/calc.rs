//! Calculation functions

use super::*;
use crate::bn::U256;

/// Largest token decimals whose unit still fits in u64
pub const MAX_DECIMALS: u8 = 19;

/// Growth ratios must exceed one by at least 2^-MIN_GROWTH_BITS, so that
/// log2 truncation stays negligible against `growth - 1`.
pub const MIN_GROWTH_BITS: u32 = 24;

/// Get the number of smallest token units in one whole unit.
pub fn unit_scale(decimals: u8) -> Result<u64, CurveError> {
    if decimals > MAX_DECIMALS {
        return Err(CurveError::InvalidCurveParameters);
    }
    Ok(10u64.pow(u32::from(decimals)))
}

/// Get the growth multiplier reached at a given supply.
///
/// growth_power = (growth_numerator / growth_denominator) ^ (supply / unit)
///
/// # Arguments
///
/// * supply - token supply in smallest units.
/// * unit - smallest units per whole token.
/// * growth_numerator - numerator of the per-unit growth ratio.
/// * growth_denominator - denominator of the per-unit growth ratio.
///
/// # Return value
///
/// growth multiplier as a 64.64 fixed-point number, one at zero supply.
pub fn growth_power(
    supply: u64,
    unit: u64,
    growth_numerator: u64,
    growth_denominator: u64,
) -> Result<Fixed64x64, CurveError> {
    let growth = Fixed64x64::from_ratio(growth_numerator.into(), growth_denominator.into())?;
    let exponent = Fixed64x64::from_ratio(supply.into(), unit.into())?;
    growth.pow(exponent)
}

/// Get a price scaled by a growth multiplier, rounded to the nearest unit.
///
/// price = base_price * growth_power
pub fn scaled_price(base_price: u64, growth_power: Fixed64x64) -> Result<u64, CurveError> {
    let price = U256::from(growth_power.to_unsigned_raw()?)
        .checked_bn_mul(base_price.into())?
        .checked_round_div(U256::one() << FRACTION_BITS)?;
    U256::to_u64(price).map_err(|_| CurveError::Overflow)
}

/// Get the reserve backing a supply, the closed form of the geometric series.
///
/// reserve = base_price * growth_power / (growth - 1)
///         = base_price * growth_power * growth_denominator
///           / (growth_numerator - growth_denominator)
///
/// Costs are differences of this value, so buying in several steps costs
/// exactly as much as buying the same range at once.
///
/// # Arguments
///
/// * base_price - price at zero supply.
/// * growth_power - growth multiplier at the supply.
/// * growth_numerator - numerator of the per-unit growth ratio.
/// * growth_denominator - denominator of the per-unit growth ratio.
///
/// # Return value
///
/// reserve units, rounded to the nearest unit.
pub fn geometric_reserve(
    base_price: u64,
    growth_power: Fixed64x64,
    growth_numerator: u64,
    growth_denominator: u64,
) -> Result<u128, CurveError> {
    let growth_delta = growth_numerator
        .checked_sub(growth_denominator)
        .filter(|delta| *delta > 0)
        .ok_or(CurveError::InvalidCurveParameters)?;
    let reserve = U256::from(growth_power.to_unsigned_raw()?)
        .checked_bn_mul(base_price.into())?
        .checked_bn_mul(growth_denominator.into())?
        .checked_round_div(U256::from(growth_delta) << FRACTION_BITS)?;
    U256::to_u128(reserve).map_err(|_| CurveError::Overflow)
}
