//! Token amounts, liquidity and square-root prices along the pool curve.
//!
//! A pool spreads its liquidity `L` uniformly over `[√Pmin, √Pmax]`. Moving
//! the price from `√Pl` to `√Pu` exchanges
//!
//! ```text
//! Δa = L · (√Pu − √Pl) / (√Pl · √Pu)
//! Δb = L · (√Pu − √Pl) >> 128
//! ```
//!
//! Square-root prices are Q64.64 and liquidity carries 64 fractional bits.
//! Amounts a user pays are rounded up, amounts a user receives and
//! liquidity credited to a user are rounded down.

use ruint::aliases::{U256, U512};

use super::fixed_point::{div_rounding_u256, div_rounding_u512, sqrt_u256};
use crate::constants::{LIQUIDITY_SCALE, RESOLUTION};
use crate::domain::Rounding;
use crate::error::{AmmError, Result};

const OVERFLOW: AmmError = AmmError::ArithmeticOverflow("curve amount");

fn narrow_u64(value: U256) -> Result<u64> {
    u64::try_from(value).map_err(|_| OVERFLOW)
}

fn narrow_u128(value: U256) -> Result<u128> {
    u128::try_from(value).map_err(|_| AmmError::ArithmeticOverflow("sqrt price"))
}

fn ordered(lower: u128, upper: u128) -> Result<(u128, u128)> {
    if lower > upper {
        return Err(AmmError::PriceOutOfRange);
    }
    Ok((lower, upper))
}

/// Token A exchanged across `[lower, upper]`, before narrowing.
pub(crate) fn delta_amount_a_wide(
    lower: u128,
    upper: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256> {
    let (lower, upper) = ordered(lower, upper)?;
    let numerator = U256::from(liquidity)
        .checked_mul(U256::from(upper - lower))
        .ok_or(OVERFLOW)?;
    let denominator = U256::from(lower)
        .checked_mul(U256::from(upper))
        .ok_or(OVERFLOW)?;
    div_rounding_u256(numerator, denominator, rounding).ok_or(AmmError::DivisionByZero)
}

/// Token B exchanged across `[lower, upper]`, before narrowing.
pub(crate) fn delta_amount_b_wide(
    lower: u128,
    upper: u128,
    liquidity: u128,
    rounding: Rounding,
) -> Result<U256> {
    let (lower, upper) = ordered(lower, upper)?;
    let product = U256::from(liquidity)
        .checked_mul(U256::from(upper - lower))
        .ok_or(OVERFLOW)?;
    let scale = usize::from(LIQUIDITY_SCALE);
    let quotient = product >> scale;
    let remainder_bits = product - (quotient << scale);
    if rounding.is_up() && !remainder_bits.is_zero() {
        quotient.checked_add(U256::from(1u64)).ok_or(OVERFLOW)
    } else {
        Ok(quotient)
    }
}

/// Token A exchanged when `liquidity` moves across `[lower, upper]`.
///
/// # Errors
///
/// Returns [`AmmError::ArithmeticOverflow`] if the amount exceeds `u64`
/// and [`AmmError::PriceOutOfRange`] if the bounds are inverted.
pub fn get_delta_amount_a(lower: u128, upper: u128, liquidity: u128, rounding: Rounding) -> Result<u64> {
    narrow_u64(delta_amount_a_wide(lower, upper, liquidity, rounding)?)
}

/// Token B exchanged when `liquidity` moves across `[lower, upper]`.
///
/// # Errors
///
/// Same as [`get_delta_amount_a`].
pub fn get_delta_amount_b(lower: u128, upper: u128, liquidity: u128, rounding: Rounding) -> Result<u64> {
    narrow_u64(delta_amount_b_wide(lower, upper, liquidity, rounding)?)
}

/// Price after `amount_in` enters the pool.
///
/// Selling A lowers the price and rounds up; selling B raises it and rounds
/// down. Both keep the pool on the safe side of the exact curve.
///
/// # Errors
///
/// Returns [`AmmError::InsufficientLiquidity`] for zero liquidity and
/// [`AmmError::ArithmeticOverflow`] if the price leaves 128 bits.
pub fn get_next_sqrt_price_from_input(
    sqrt_price: u128,
    liquidity: u128,
    amount_in: u64,
    a_for_b: bool,
) -> Result<u128> {
    if liquidity == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    if amount_in == 0 {
        return Ok(sqrt_price);
    }
    if a_for_b {
        // √P' = L·√P / (L + Δa·√P)
        let product = U256::from(amount_in)
            .checked_mul(U256::from(sqrt_price))
            .ok_or(OVERFLOW)?;
        let numerator = U256::from(liquidity)
            .checked_mul(U256::from(sqrt_price))
            .ok_or(OVERFLOW)?;
        let denominator = U256::from(liquidity).checked_add(product).ok_or(OVERFLOW)?;
        let next = div_rounding_u256(numerator, denominator, Rounding::Up)
            .ok_or(AmmError::DivisionByZero)?;
        narrow_u128(next)
    } else {
        // √P' = √P + Δb / L
        let quotient = div_rounding_u256(
            U256::from(amount_in) << usize::from(LIQUIDITY_SCALE),
            U256::from(liquidity),
            Rounding::Down,
        )
        .ok_or(AmmError::DivisionByZero)?;
        let next = U256::from(sqrt_price).checked_add(quotient).ok_or(OVERFLOW)?;
        narrow_u128(next)
    }
}

/// Price after `amount_out` leaves the pool.
///
/// Paying out A raises the price and rounds up; paying out B lowers it and
/// rounds down.
///
/// # Errors
///
/// Returns [`AmmError::InsufficientLiquidity`] if the pool cannot pay
/// `amount_out` at any price.
pub fn get_next_sqrt_price_from_output(
    sqrt_price: u128,
    liquidity: u128,
    amount_out: u64,
    a_for_b: bool,
) -> Result<u128> {
    if liquidity == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    if amount_out == 0 {
        return Ok(sqrt_price);
    }
    if a_for_b {
        // B leaves: √P' = √P − Δb / L
        let quotient = div_rounding_u256(
            U256::from(amount_out) << usize::from(LIQUIDITY_SCALE),
            U256::from(liquidity),
            Rounding::Up,
        )
        .ok_or(AmmError::DivisionByZero)?;
        let current = U256::from(sqrt_price);
        if quotient >= current {
            return Err(AmmError::InsufficientLiquidity);
        }
        narrow_u128(current - quotient)
    } else {
        // A leaves: √P' = L·√P / (L − Δa·√P)
        let product = U256::from(amount_out)
            .checked_mul(U256::from(sqrt_price))
            .ok_or(OVERFLOW)?;
        let liquidity_wide = U256::from(liquidity);
        if product >= liquidity_wide {
            return Err(AmmError::InsufficientLiquidity);
        }
        let numerator = liquidity_wide
            .checked_mul(U256::from(sqrt_price))
            .ok_or(OVERFLOW)?;
        let next = div_rounding_u256(numerator, liquidity_wide - product, Rounding::Up)
            .ok_or(AmmError::DivisionByZero)?;
        narrow_u128(next)
    }
}

/// Liquidity that `amount_a` of token A supports across `[lower, upper]`.
///
/// `L = Δa · √Pl · √Pu / (√Pu − √Pl)`, rounded down.
///
/// # Errors
///
/// Returns [`AmmError::PriceOutOfRange`] for an empty or inverted range and
/// [`AmmError::ArithmeticOverflow`] if the result exceeds `u128`.
pub fn liquidity_from_amount_a(amount_a: u64, lower: u128, upper: u128) -> Result<u128> {
    let (lower, upper) = ordered(lower, upper)?;
    if lower == upper {
        return Err(AmmError::PriceOutOfRange);
    }
    let product = U512::from(amount_a)
        .checked_mul(U512::from(lower))
        .and_then(|p| p.checked_mul(U512::from(upper)))
        .ok_or(OVERFLOW)?;
    let liquidity = div_rounding_u512(product, U512::from(upper - lower), Rounding::Down)
        .ok_or(AmmError::DivisionByZero)?;
    u128::try_from(liquidity).map_err(|_| AmmError::ArithmeticOverflow("liquidity"))
}

/// Liquidity that `amount_b` of token B supports across `[lower, upper]`.
///
/// `L = (Δb << 128) / (√Pu − √Pl)`, rounded down.
///
/// # Errors
///
/// Same as [`liquidity_from_amount_a`].
pub fn liquidity_from_amount_b(amount_b: u64, lower: u128, upper: u128) -> Result<u128> {
    let (lower, upper) = ordered(lower, upper)?;
    if lower == upper {
        return Err(AmmError::PriceOutOfRange);
    }
    let shifted = U256::from(amount_b) << usize::from(LIQUIDITY_SCALE);
    let liquidity = div_rounding_u256(shifted, U256::from(upper - lower), Rounding::Down)
        .ok_or(AmmError::DivisionByZero)?;
    u128::try_from(liquidity).map_err(|_| AmmError::ArithmeticOverflow("liquidity"))
}

/// Largest liquidity both deposits support at `sqrt_price` inside
/// `[sqrt_min, sqrt_max]`.
///
/// Token A backs the part of the range above the price and token B the
/// part below it. At either edge only one token is needed.
///
/// # Errors
///
/// Returns [`AmmError::PriceOutOfRange`] if `sqrt_price` is outside the
/// range.
pub fn liquidity_from_amounts(
    sqrt_price: u128,
    sqrt_min: u128,
    sqrt_max: u128,
    amount_a: u64,
    amount_b: u64,
) -> Result<u128> {
    if sqrt_price < sqrt_min || sqrt_price > sqrt_max {
        return Err(AmmError::PriceOutOfRange);
    }
    if sqrt_price == sqrt_min {
        return liquidity_from_amount_a(amount_a, sqrt_price, sqrt_max);
    }
    if sqrt_price == sqrt_max {
        return liquidity_from_amount_b(amount_b, sqrt_min, sqrt_price);
    }
    let from_a = liquidity_from_amount_a(amount_a, sqrt_price, sqrt_max)?;
    let from_b = liquidity_from_amount_b(amount_b, sqrt_min, sqrt_price)?;
    Ok(from_a.min(from_b))
}

/// Token amounts backing `liquidity` at `sqrt_price`: A over
/// `[sqrt_price, sqrt_max]`, B over `[sqrt_min, sqrt_price]`.
///
/// Use [`Rounding::Up`] for deposits and [`Rounding::Down`] for
/// withdrawals.
///
/// # Errors
///
/// Returns [`AmmError::PriceOutOfRange`] if `sqrt_price` is outside the
/// range and [`AmmError::ArithmeticOverflow`] if an amount exceeds `u64`.
pub fn amounts_from_liquidity(
    liquidity: u128,
    sqrt_price: u128,
    sqrt_min: u128,
    sqrt_max: u128,
    rounding: Rounding,
) -> Result<(u64, u64)> {
    if sqrt_price < sqrt_min || sqrt_price > sqrt_max {
        return Err(AmmError::PriceOutOfRange);
    }
    let amount_a = get_delta_amount_a(sqrt_price, sqrt_max, liquidity, rounding)?;
    let amount_b = get_delta_amount_b(sqrt_min, sqrt_price, liquidity, rounding)?;
    Ok((amount_a, amount_b))
}

/// Deposit the pool creator owes for the initial liquidity, rounded up.
///
/// # Errors
///
/// Same as [`amounts_from_liquidity`].
pub fn get_initialize_amounts(
    sqrt_min: u128,
    sqrt_max: u128,
    sqrt_price: u128,
    liquidity: u128,
) -> Result<(u64, u64)> {
    amounts_from_liquidity(liquidity, sqrt_price, sqrt_min, sqrt_max, Rounding::Up)
}

/// Q64.64 square-root price for a deposit ratio: `√(amount_b / amount_a)`,
/// rounded down.
///
/// # Examples
///
/// ```
/// use rangepool::math::{sqrt_price_from_ratio, ONE_Q64};
///
/// assert_eq!(sqrt_price_from_ratio(1, 4), Ok(2 * ONE_Q64));
/// assert_eq!(sqrt_price_from_ratio(4, 1), Ok(ONE_Q64 / 2));
/// ```
///
/// # Errors
///
/// Returns [`AmmError::InvalidQuantity`] if either amount is zero.
pub fn sqrt_price_from_ratio(amount_a: u64, amount_b: u64) -> Result<u128> {
    if amount_a == 0 || amount_b == 0 {
        return Err(AmmError::InvalidQuantity("ratio amounts must be non-zero"));
    }
    let shift = usize::from(RESOLUTION) * 2;
    let price_q128 = (U256::from(amount_b) << shift) / U256::from(amount_a);
    narrow_u128(sqrt_u256(price_q128))
}
