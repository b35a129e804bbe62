//! Basis-point percentages.

use core::fmt;

use super::{Amount, Rounding};
use crate::constants::BASIS_POINT_MAX;
use crate::error::AmmError;

/// A percentage expressed in basis points (1 bp = 0.01%, 10 000 bp = 100%).
///
/// Used for token transfer fees and for the per-period reduction of an
/// exponential fee schedule.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{Amount, BasisPoints, Rounding};
///
/// let bp = BasisPoints::new(50);
/// assert_eq!(bp.apply(Amount::new(1_000), Rounding::Up), Ok(Amount::new(5)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasisPoints(u16);

impl BasisPoints {
    /// 0%.
    pub const ZERO: Self = Self(0);

    /// 100%.
    pub const MAX_PERCENT: Self = Self(10_000);

    /// Creates a new `BasisPoints` from a raw value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }

    /// Returns `true` if the value does not exceed 100%.
    #[must_use]
    pub const fn is_valid_percent(&self) -> bool {
        self.0 as u64 <= BASIS_POINT_MAX
    }

    /// Computes `amount × self / 10 000` with explicit rounding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the result does not fit
    /// an [`Amount`], which can only happen above 100%.
    pub fn apply(&self, amount: Amount, rounding: Rounding) -> crate::error::Result<Amount> {
        let product = u128::from(amount.get()) * u128::from(self.0);
        let value = rounding
            .div_u128(product, u128::from(BASIS_POINT_MAX))
            .ok_or(AmmError::DivisionByZero)?;
        u64::try_from(value)
            .map(Amount::new)
            .map_err(|_| AmmError::ArithmeticOverflow("basis points apply"))
    }
}

impl fmt::Display for BasisPoints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}bp", self.0)
    }
}
