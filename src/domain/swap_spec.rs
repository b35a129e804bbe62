//! Swap requests.

use core::fmt;

use super::Amount;
use crate::error::AmmError;

/// Which side of a swap the caller fixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapMode {
    /// The input amount is fixed; output is computed.
    ExactIn,
    /// The output amount is fixed; input is computed.
    ExactOut,
}

impl fmt::Display for SwapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn => write!(f, "ExactIn"),
            Self::ExactOut => write!(f, "ExactOut"),
        }
    }
}

/// A swap request together with the caller's slippage bound.
///
/// Amounts are what the trader's own accounts see: the input is what
/// leaves the trader's wallet and the output is what arrives, both after
/// any token transfer fee.
///
/// # Invariants
///
/// The fixed amount is always non-zero.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{Amount, SwapMode, SwapSpec};
///
/// let spec = SwapSpec::exact_in(Amount::new(1_000), Amount::new(990)).expect("non-zero");
/// assert_eq!(spec.mode(), SwapMode::ExactIn);
/// assert!(SwapSpec::exact_out(Amount::ZERO, Amount::MAX).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SwapSpec {
    /// Sell exactly `amount_in`, receive at least `minimum_amount_out`.
    ExactIn {
        /// Amount paid.
        amount_in: Amount,
        /// Lower bound on the amount received.
        minimum_amount_out: Amount,
    },
    /// Receive exactly `amount_out`, pay at most `maximum_amount_in`.
    ExactOut {
        /// Amount received.
        amount_out: Amount,
        /// Upper bound on the amount paid.
        maximum_amount_in: Amount,
    },
}

impl SwapSpec {
    /// Exact-input request.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `amount_in` is zero.
    pub const fn exact_in(amount_in: Amount, minimum_amount_out: Amount) -> crate::error::Result<Self> {
        if amount_in.is_zero() {
            return Err(AmmError::InvalidQuantity("swap amount must be non-zero"));
        }
        Ok(Self::ExactIn {
            amount_in,
            minimum_amount_out,
        })
    }

    /// Exact-output request.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidQuantity`] if `amount_out` is zero.
    pub const fn exact_out(amount_out: Amount, maximum_amount_in: Amount) -> crate::error::Result<Self> {
        if amount_out.is_zero() {
            return Err(AmmError::InvalidQuantity("swap amount must be non-zero"));
        }
        Ok(Self::ExactOut {
            amount_out,
            maximum_amount_in,
        })
    }

    /// The fixed side of the request.
    #[must_use]
    pub const fn mode(&self) -> SwapMode {
        match self {
            Self::ExactIn { .. } => SwapMode::ExactIn,
            Self::ExactOut { .. } => SwapMode::ExactOut,
        }
    }

    /// The fixed amount, whichever side it is on.
    pub const fn amount(&self) -> Amount {
        match self {
            Self::ExactIn { amount_in, .. } => *amount_in,
            Self::ExactOut { amount_out, .. } => *amount_out,
        }
    }
}

impl fmt::Display for SwapSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExactIn {
                amount_in,
                minimum_amount_out,
            } => write!(f, "ExactIn({amount_in}, min out {minimum_amount_out})"),
            Self::ExactOut {
                amount_out,
                maximum_amount_in,
            } => write!(f, "ExactOut({amount_out}, max in {maximum_amount_in})"),
        }
    }
}
