//! Per-liquidity fee accumulators and position settlement.

use ruint::aliases::U256;

use crate::constants::LIQUIDITY_SCALE;
use crate::domain::TokenSide;
use crate::error::{AmmError, Result};
use crate::math::{mul_shr_256, shl_div_256};
use crate::state::Position;

/// Fees earned by one unit of liquidity since pool creation, per token,
/// scaled by 2¹²⁸.
///
/// The pool holds the global value; each position holds the value it last
/// settled at. A position's unclaimed fee is the difference times its
/// liquidity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FeeGrowth {
    /// Token A fees per unit of liquidity.
    pub per_liquidity_a: U256,
    /// Token B fees per unit of liquidity.
    pub per_liquidity_b: U256,
}

impl FeeGrowth {
    /// Accumulator for `side`.
    #[must_use]
    pub const fn get(&self, side: TokenSide) -> U256 {
        match side {
            TokenSide::A => self.per_liquidity_a,
            TokenSide::B => self.per_liquidity_b,
        }
    }

    /// Spreads `lp_fee` over `liquidity`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::DivisionByZero`] if a non-zero fee meets zero
    /// liquidity and [`AmmError::ArithmeticOverflow`] if the accumulator
    /// overflows.
    pub fn accrue(&mut self, side: TokenSide, lp_fee: u64, liquidity: u128) -> Result<()> {
        if lp_fee == 0 {
            return Ok(());
        }
        let delta = shl_div_256(u128::from(lp_fee), liquidity, LIQUIDITY_SCALE)
            .ok_or(AmmError::DivisionByZero)?;
        let slot = match side {
            TokenSide::A => &mut self.per_liquidity_a,
            TokenSide::B => &mut self.per_liquidity_b,
        };
        *slot = slot
            .checked_add(delta)
            .ok_or(AmmError::ArithmeticOverflow("fee growth"))?;
        Ok(())
    }

    /// Fees earned by `liquidity` between `checkpoint` and `self`, rounded
    /// down.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the checkpoint is ahead of the
    /// global value and [`AmmError::ArithmeticOverflow`] if the fee leaves
    /// `u64`.
    pub fn pending(&self, checkpoint: &Self, liquidity: u128) -> Result<(u64, u64)> {
        let earned = |global: U256, last: U256| -> Result<u64> {
            let delta = global
                .checked_sub(last)
                .ok_or(AmmError::Underflow("fee checkpoint ahead of pool"))?;
            let fee = mul_shr_256(delta, liquidity, LIQUIDITY_SCALE)
                .ok_or(AmmError::ArithmeticOverflow("pending fee"))?;
            u64::try_from(fee).map_err(|_| AmmError::ArithmeticOverflow("pending fee"))
        };
        Ok((
            earned(self.per_liquidity_a, checkpoint.per_liquidity_a)?,
            earned(self.per_liquidity_b, checkpoint.per_liquidity_b)?,
        ))
    }
}

/// Credits `position` with the fees its whole liquidity earned since its
/// last checkpoint and moves the checkpoint to `global`.
///
/// Must run before any change to the position's liquidity, so fees are
/// always measured against the liquidity that earned them. A second call
/// without an intervening swap credits nothing.
///
/// # Errors
///
/// Propagates [`FeeGrowth::pending`] errors and returns
/// [`AmmError::ArithmeticOverflow`] if the owed balance overflows.
pub fn settle_position_fees(position: &mut Position, global: &FeeGrowth) -> Result<()> {
    let total = position.total_liquidity()?.get();
    let (fee_a, fee_b) = global.pending(&position.fee_checkpoint, total)?;
    let overflow = AmmError::ArithmeticOverflow("fee owed");
    position.fee_a_owed = position.fee_a_owed.checked_add(fee_a).ok_or(overflow)?;
    position.fee_b_owed = position.fee_b_owed.checked_add(fee_b).ok_or(overflow)?;
    position.fee_checkpoint = *global;
    Ok(())
}
