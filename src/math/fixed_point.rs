//! Wide-integer helpers for Q64.64 arithmetic.
//!
//! Every helper widens its operands to [`U256`] (or [`U512`] where two
//! 128-bit factors meet a third), performs the operation with checked
//! arithmetic and narrows the result back. `None` means the result does
//! not fit the return type or the divisor is zero; callers map it to an
//! [`AmmError`](crate::error::AmmError).

use ruint::aliases::{U256, U512};

use crate::constants::RESOLUTION;
use crate::domain::Rounding;

/// `1.0` in Q64.64.
pub const ONE_Q64: u128 = 1u128 << RESOLUTION;

/// Divides two wide integers in the requested direction.
#[must_use]
pub fn div_rounding_u256(numerator: U256, denominator: U256, rounding: Rounding) -> Option<U256> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator / denominator;
    if rounding.is_up() && !(numerator % denominator).is_zero() {
        quotient.checked_add(U256::from(1u64))
    } else {
        Some(quotient)
    }
}

/// Divides two 512-bit integers in the requested direction.
#[must_use]
pub fn div_rounding_u512(numerator: U512, denominator: U512, rounding: Rounding) -> Option<U512> {
    if denominator.is_zero() {
        return None;
    }
    let quotient = numerator / denominator;
    if rounding.is_up() && !(numerator % denominator).is_zero() {
        quotient.checked_add(U512::from(1u64))
    } else {
        Some(quotient)
    }
}

/// `x × y / denominator` without intermediate overflow.
///
/// # Examples
///
/// ```
/// use rangepool::domain::Rounding;
/// use rangepool::math::mul_div;
///
/// assert_eq!(mul_div(u128::MAX, 2, 4, Rounding::Down), Some(u128::MAX / 2));
/// assert_eq!(mul_div(10, 1, 3, Rounding::Up), Some(4));
/// ```
#[must_use]
pub fn mul_div(x: u128, y: u128, denominator: u128, rounding: Rounding) -> Option<u128> {
    let product = U256::from(x).checked_mul(U256::from(y))?;
    let result = div_rounding_u256(product, U256::from(denominator), rounding)?;
    u128::try_from(result).ok()
}

/// `(x × y) >> offset`, rounding down.
#[must_use]
pub fn mul_shr(x: u128, y: u128, offset: u8) -> Option<u128> {
    let product = U256::from(x).checked_mul(U256::from(y))?;
    u128::try_from(product >> usize::from(offset)).ok()
}

/// `(x << offset) / y` in the requested direction.
#[must_use]
pub fn shl_div(x: u128, y: u128, offset: u8, rounding: Rounding) -> Option<u128> {
    let shifted = U256::from(x).checked_shl(usize::from(offset))?;
    let result = div_rounding_u256(shifted, U256::from(y), rounding)?;
    u128::try_from(result).ok()
}

/// `(x << offset) / y` kept at 256 bits, rounding down.
///
/// Used for per-liquidity accumulators, which may exceed 128 bits.
#[must_use]
pub fn shl_div_256(x: u128, y: u128, offset: u8) -> Option<U256> {
    let shifted = U256::from(x).checked_shl(usize::from(offset))?;
    div_rounding_u256(shifted, U256::from(y), Rounding::Down)
}

/// `(x × y) >> offset` for a 256-bit accumulator delta, rounding down.
#[must_use]
pub fn mul_shr_256(x: U256, y: u128, offset: u8) -> Option<u128> {
    let product = x.checked_mul(U256::from(y))?;
    u128::try_from(product >> usize::from(offset)).ok()
}

/// `base ^ exponent` where `base` is Q64.64, rounding down at each step.
///
/// # Examples
///
/// ```
/// use rangepool::math::{pow_q64, ONE_Q64};
///
/// let half = ONE_Q64 / 2;
/// assert_eq!(pow_q64(half, 3), Some(ONE_Q64 / 8));
/// assert_eq!(pow_q64(half, 0), Some(ONE_Q64));
/// ```
#[must_use]
pub fn pow_q64(base: u128, exponent: u32) -> Option<u128> {
    let shift = usize::from(RESOLUTION);
    let mut result = U256::from(ONE_Q64);
    let mut squared = U256::from(base);
    let mut remaining = exponent;
    while remaining > 0 {
        if remaining & 1 == 1 {
            result = result.checked_mul(squared)? >> shift;
        }
        remaining >>= 1;
        if remaining > 0 {
            squared = squared.checked_mul(squared)? >> shift;
        }
    }
    u128::try_from(result).ok()
}

/// Integer square root, rounding down (Newton iteration).
///
/// # Examples
///
/// ```
/// use ruint::aliases::U256;
/// use rangepool::math::sqrt_u256;
///
/// assert_eq!(sqrt_u256(U256::from(99u64)), U256::from(9u64));
/// assert_eq!(sqrt_u256(U256::from(100u64)), U256::from(10u64));
/// ```
#[must_use]
pub fn sqrt_u256(value: U256) -> U256 {
    if value.is_zero() {
        return U256::ZERO;
    }
    // 2^ceil(bits/2) is never below the root, so the iteration decreases.
    let mut x = U256::from(1u64) << value.bit_len().div_ceil(2);
    loop {
        let y = (x + value / x) >> 1usize;
        if y >= x {
            return x;
        }
        x = y;
    }
}
