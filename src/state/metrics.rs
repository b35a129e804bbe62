//! Lifetime counters kept for reporting.

use crate::domain::TokenSide;
use crate::error::{AmmError, Result};
use crate::fee::FeeBreakdown;

/// Cumulative fees and position count of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolMetrics {
    /// Token A fees accrued to liquidity providers.
    pub total_lp_a_fee: u128,
    /// Token B fees accrued to liquidity providers.
    pub total_lp_b_fee: u128,
    /// Token A fees accrued to the protocol.
    pub total_protocol_a_fee: u64,
    /// Token B fees accrued to the protocol.
    pub total_protocol_b_fee: u64,
    /// Token A fees accrued to the partner.
    pub total_partner_a_fee: u64,
    /// Token B fees accrued to the partner.
    pub total_partner_b_fee: u64,
    /// Token A fees paid to referrers.
    pub total_referral_a_fee: u64,
    /// Token B fees paid to referrers.
    pub total_referral_b_fee: u64,
    /// Positions ever opened on the pool.
    pub total_position: u64,
}

impl PoolMetrics {
    /// Records a swap fee collected in `side`.
    pub(crate) fn accumulate_fee(&mut self, side: TokenSide, fee: &FeeBreakdown) -> Result<()> {
        let overflow = AmmError::ArithmeticOverflow("pool metrics");
        let (lp, protocol, partner, referral) = match side {
            TokenSide::A => (
                &mut self.total_lp_a_fee,
                &mut self.total_protocol_a_fee,
                &mut self.total_partner_a_fee,
                &mut self.total_referral_a_fee,
            ),
            TokenSide::B => (
                &mut self.total_lp_b_fee,
                &mut self.total_protocol_b_fee,
                &mut self.total_partner_b_fee,
                &mut self.total_referral_b_fee,
            ),
        };
        *lp = lp.checked_add(u128::from(fee.lp)).ok_or(overflow)?;
        *protocol = protocol.checked_add(fee.protocol).ok_or(overflow)?;
        *partner = partner.checked_add(fee.partner).ok_or(overflow)?;
        *referral = referral.checked_add(fee.referral).ok_or(overflow)?;
        Ok(())
    }

    pub(crate) fn record_position(&mut self) -> Result<()> {
        self.total_position = self
            .total_position
            .checked_add(1)
            .ok_or(AmmError::ArithmeticOverflow("position count"))?;
        Ok(())
    }
}

/// Lifetime fee claims of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PositionMetrics {
    /// Token A fees claimed.
    pub total_claimed_a_fee: u64,
    /// Token B fees claimed.
    pub total_claimed_b_fee: u64,
}

impl PositionMetrics {
    pub(crate) fn record_claim(&mut self, fee_a: u64, fee_b: u64) -> Result<()> {
        let overflow = AmmError::ArithmeticOverflow("position metrics");
        self.total_claimed_a_fee = self.total_claimed_a_fee.checked_add(fee_a).ok_or(overflow)?;
        self.total_claimed_b_fee = self.total_claimed_b_fee.checked_add(fee_b).ok_or(overflow)?;
        Ok(())
    }
}
