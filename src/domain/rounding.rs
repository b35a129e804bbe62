//! Explicit rounding direction for pool arithmetic.

/// Direction in which an inexact quotient is rounded.
///
/// Every division inside the pool takes a `Rounding`. Amounts paid by a
/// user are rounded [`Up`](Self::Up) and amounts paid out by the pool are
/// rounded [`Down`](Self::Down), so the pool never loses value to rounding.
///
/// # Examples
///
/// ```
/// use rangepool::domain::Rounding;
///
/// assert_eq!(Rounding::Up.div_u128(7, 2), Some(4));
/// assert_eq!(Rounding::Down.div_u128(7, 2), Some(3));
/// assert_eq!(Rounding::Down.div_u128(7, 0), None);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rounding {
    /// Round towards positive infinity.
    Up,
    /// Round towards zero.
    Down,
}

impl Rounding {
    /// Returns `true` if this is [`Rounding::Up`].
    #[must_use]
    pub const fn is_up(&self) -> bool {
        matches!(self, Self::Up)
    }

    /// Divides `numerator` by `denominator` in this direction.
    ///
    /// Returns `None` when `denominator` is zero.
    #[must_use]
    pub const fn div_u128(&self, numerator: u128, denominator: u128) -> Option<u128> {
        if denominator == 0 {
            return None;
        }
        let quotient = numerator / denominator;
        match self {
            Self::Up if numerator % denominator != 0 => Some(quotient + 1),
            _ => Some(quotient),
        }
    }
}
