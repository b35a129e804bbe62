//! Fees withheld by the token ledger on every transfer.

use crate::constants::BASIS_POINT_MAX;
use crate::domain::{Amount, BasisPoints, Rounding};
use crate::error::{AmmError, Result};

/// A mint's transfer fee: `min(ceil(amount × bps / 10 000), maximum_fee)`.
///
/// The pool never sees the withheld part, so every amount it books is the
/// amount actually received.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{Amount, BasisPoints};
/// use rangepool::fee::TransferFee;
///
/// let fee = TransferFee::new(BasisPoints::new(100), Amount::new(5)).expect("valid");
/// assert_eq!(fee.fee_for(Amount::new(101)), Amount::new(2));
/// assert_eq!(fee.fee_for(Amount::new(10_000)), Amount::new(5));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TransferFee {
    basis_points: BasisPoints,
    maximum_fee: Amount,
}

impl TransferFee {
    /// Creates a transfer fee.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if `basis_points` exceeds 100%.
    pub fn new(basis_points: BasisPoints, maximum_fee: Amount) -> Result<Self> {
        if !basis_points.is_valid_percent() {
            return Err(AmmError::InvalidFee("transfer fee above 100%"));
        }
        Ok(Self {
            basis_points,
            maximum_fee,
        })
    }

    /// Rate in basis points.
    #[must_use]
    pub const fn basis_points(&self) -> BasisPoints {
        self.basis_points
    }

    /// Per-transfer cap.
    #[must_use]
    pub const fn maximum_fee(&self) -> Amount {
        self.maximum_fee
    }

    /// Fee withheld when `amount` is sent.
    #[must_use]
    pub fn fee_for(&self, amount: Amount) -> Amount {
        if amount.is_zero() || self.basis_points == BasisPoints::ZERO {
            return Amount::ZERO;
        }
        // Cannot fail at or below 100%.
        let fee = self
            .basis_points
            .apply(amount, Rounding::Up)
            .unwrap_or(amount);
        fee.min(self.maximum_fee)
    }

    /// Amount received when `amount` is sent.
    #[must_use]
    pub fn excluded_amount(&self, amount: Amount) -> Amount {
        Amount::new(amount.get() - self.fee_for(amount).get())
    }

    /// Smallest amount to send so that `received` arrives.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the grossed-up amount
    /// exceeds `u64`.
    pub fn included_amount(&self, received: Amount) -> Result<Amount> {
        let overflow = AmmError::ArithmeticOverflow("transfer fee included amount");
        if received.is_zero() || self.basis_points == BasisPoints::ZERO {
            return Ok(received);
        }
        if self.basis_points == BasisPoints::MAX_PERCENT {
            return received.checked_add(&self.maximum_fee).ok_or(overflow);
        }
        let bps = u128::from(self.basis_points.get());
        let scale = u128::from(BASIS_POINT_MAX);
        let gross = Rounding::Up
            .div_u128(u128::from(received.get()) * scale, scale - bps)
            .ok_or(AmmError::DivisionByZero)?;
        let fee = gross - u128::from(received.get());
        if fee >= u128::from(self.maximum_fee.get()) {
            return received.checked_add(&self.maximum_fee).ok_or(overflow);
        }
        u64::try_from(gross).map(Amount::new).map_err(|_| overflow)
    }
}
