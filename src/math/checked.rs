//! Checked arithmetic for domain wrapper types.
//!
//! [`CheckedArithmetic`] turns the `Option` returned by the wrappers' own
//! checked operations into an [`AmmError`] that names the operation, so a
//! pool method can chain them with `?`.
//!
//! # Examples
//!
//! ```
//! use rangepool::domain::Liquidity;
//! use rangepool::math::CheckedArithmetic;
//!
//! let total = Liquidity::new(5).safe_add(&Liquidity::new(7));
//! assert_eq!(total, Ok(Liquidity::new(12)));
//! assert!(Liquidity::new(5).safe_sub(&Liquidity::new(7)).is_err());
//! ```

use crate::domain::{Amount, Liquidity};
use crate::error::AmmError;

/// Fallible addition and subtraction.
///
/// No implementation saturates: every out-of-range result is an error.
pub trait CheckedArithmetic: Sized {
    /// Checked addition.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the sum does not fit.
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError>;

    /// Checked subtraction.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if `other` exceeds `self`.
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError>;
}

impl CheckedArithmetic for Amount {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::ArithmeticOverflow("amount addition"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("amount subtraction"))
    }
}

impl CheckedArithmetic for Liquidity {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(other)
            .ok_or(AmmError::ArithmeticOverflow("liquidity addition"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(other)
            .ok_or(AmmError::Underflow("liquidity subtraction"))
    }
}

impl CheckedArithmetic for u64 {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(*other)
            .ok_or(AmmError::ArithmeticOverflow("u64 addition"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(*other).ok_or(AmmError::Underflow("u64 subtraction"))
    }
}

impl CheckedArithmetic for u128 {
    #[inline]
    fn safe_add(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_add(*other)
            .ok_or(AmmError::ArithmeticOverflow("u128 addition"))
    }

    #[inline]
    fn safe_sub(&self, other: &Self) -> Result<Self, AmmError> {
        self.checked_sub(*other)
            .ok_or(AmmError::Underflow("u128 subtraction"))
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn amount_add_overflow() {
        let Err(AmmError::ArithmeticOverflow(_)) = Amount::MAX.safe_add(&Amount::new(1)) else {
            panic!("expected ArithmeticOverflow");
        };
    }

    #[test]
    fn amount_sub_underflow() {
        let Err(AmmError::Underflow(_)) = Amount::new(1).safe_sub(&Amount::new(2)) else {
            panic!("expected Underflow");
        };
    }

    #[test]
    fn liquidity_round_trip() {
        let Ok(sum) = Liquidity::new(40).safe_add(&Liquidity::new(2)) else {
            panic!("expected Ok");
        };
        assert_eq!(sum.safe_sub(&Liquidity::new(2)), Ok(Liquidity::new(40)));
    }

    #[test]
    fn primitive_impls() {
        assert_eq!(5u64.safe_add(&6), Ok(11));
        assert!(0u128.safe_sub(&1).is_err());
    }
}
