//! Outcome of a swap.

use super::{Amount, TokenSide, TradeDirection};
use crate::fee::FeeBreakdown;

/// What a swap (or a quote) did.
///
/// `amount_in` is what left the trader's account and `amount_out` is what
/// arrived in it, both after token transfer fees. The trading fee is
/// reported separately and is denominated in `fee_side`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct SwapResult {
    direction: TradeDirection,
    amount_in: Amount,
    amount_out: Amount,
    next_sqrt_price: u128,
    fee: FeeBreakdown,
    fee_side: TokenSide,
}

impl SwapResult {
    pub(crate) const fn new(
        direction: TradeDirection,
        amount_in: Amount,
        amount_out: Amount,
        next_sqrt_price: u128,
        fee: FeeBreakdown,
        fee_side: TokenSide,
    ) -> Self {
        Self {
            direction,
            amount_in,
            amount_out,
            next_sqrt_price,
            fee,
            fee_side,
        }
    }

    /// Direction of the trade.
    #[must_use]
    pub const fn direction(&self) -> TradeDirection {
        self.direction
    }

    /// Amount the trader paid.
    pub const fn amount_in(&self) -> Amount {
        self.amount_in
    }

    /// Amount the trader received.
    pub const fn amount_out(&self) -> Amount {
        self.amount_out
    }

    /// Pool square-root price after the trade.
    #[must_use]
    pub const fn next_sqrt_price(&self) -> u128 {
        self.next_sqrt_price
    }

    /// How the trading fee was split.
    #[must_use]
    pub const fn fee(&self) -> FeeBreakdown {
        self.fee
    }

    /// Token the trading fee is denominated in.
    #[must_use]
    pub const fn fee_side(&self) -> TokenSide {
        self.fee_side
    }
}
