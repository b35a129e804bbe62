//! Fee parameters of a pool and the rate in force at a given point.

use super::{
    current_base_fee_rate, split_fee, validate_split, DynamicFeeState, FeeBreakdown, FeeModifier,
    ReferralFeeSource,
};
use crate::constants::{FEE_DENOMINATOR, MAX_FEE_NUMERATOR, MIN_FEE_NUMERATOR};
use crate::domain::Rounding;
use crate::error::{AmmError, Result};
use crate::math::mul_div;

/// Trading fee schedule and split shared by every pool of a config.
///
/// # Examples
///
/// ```
/// use rangepool::fee::{FeeModifier, PoolFeeParameters, ReferralFeeSource};
///
/// let fees = PoolFeeParameters {
///     cliff_fee_numerator: 2_500_000, // 0.25%
///     modifier: FeeModifier::None,
///     protocol_fee_percent: 20,
///     partner_fee_percent: 0,
///     referral_fee_percent: 20,
///     referral_fee_source: ReferralFeeSource::Protocol,
/// };
/// assert!(fees.validate().is_ok());
/// assert_eq!(fees.current_fee_numerator(10, 0, None), Ok(2_500_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PoolFeeParameters {
    /// Fee numerator in force at activation.
    pub cliff_fee_numerator: u64,
    /// Decay or dynamic surcharge applied on top of the cliff fee.
    pub modifier: FeeModifier,
    /// Protocol share of each fee, in percent.
    pub protocol_fee_percent: u8,
    /// Partner share of each fee, in percent.
    pub partner_fee_percent: u8,
    /// Referrer share of each fee, in percent.
    pub referral_fee_percent: u8,
    /// Which share pays the referrer.
    pub referral_fee_source: ReferralFeeSource,
}

impl PoolFeeParameters {
    /// Checks every fee parameter.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] if the cliff fee lies outside
    /// `[MIN_FEE_NUMERATOR, MAX_FEE_NUMERATOR]`, if the modifier is
    /// malformed, or if the split percentages are incoherent.
    pub fn validate(&self) -> Result<()> {
        if !(MIN_FEE_NUMERATOR..=MAX_FEE_NUMERATOR).contains(&self.cliff_fee_numerator) {
            return Err(AmmError::InvalidFee("cliff fee outside permitted range"));
        }
        match &self.modifier {
            FeeModifier::None => {}
            FeeModifier::Decay(scheduler) => scheduler.validate(self.cliff_fee_numerator)?,
            FeeModifier::Dynamic(params) => {
                params.validate()?;
                if params.max_fee_numerator < self.cliff_fee_numerator {
                    return Err(AmmError::InvalidFee("dynamic fee cap below cliff fee"));
                }
            }
        }
        validate_split(
            self.protocol_fee_percent,
            self.partner_fee_percent,
            self.referral_fee_percent,
            self.referral_fee_source,
        )
    }

    /// Base fee numerator at `current_point`, before any dynamic surcharge.
    ///
    /// # Errors
    ///
    /// Propagates scheduler errors.
    pub fn current_base_fee_numerator(&self, current_point: u64, activation_point: u64) -> Result<u64> {
        let periods = match &self.modifier {
            FeeModifier::Decay(scheduler) => scheduler.elapsed_periods(current_point, activation_point),
            FeeModifier::None | FeeModifier::Dynamic(_) => 0,
        };
        current_base_fee_rate(self.cliff_fee_numerator, &self.modifier, periods)
    }

    /// Total fee numerator at `current_point`: the base rate plus, for a
    /// dynamic fee, the volatility surcharge, capped at the dynamic cap and
    /// at [`MAX_FEE_NUMERATOR`].
    ///
    /// # Errors
    ///
    /// Propagates scheduler and surcharge errors.
    pub fn current_fee_numerator(
        &self,
        current_point: u64,
        activation_point: u64,
        dynamic_state: Option<&DynamicFeeState>,
    ) -> Result<u64> {
        let base = self.current_base_fee_numerator(current_point, activation_point)?;
        let total = match (&self.modifier, dynamic_state) {
            (FeeModifier::Dynamic(params), Some(state)) => {
                let variable = state.variable_fee_numerator(params)?;
                base.saturating_add(variable).min(params.max_fee_numerator)
            }
            _ => base,
        };
        Ok(total.min(MAX_FEE_NUMERATOR))
    }

    /// Splits a collected trading fee.
    ///
    /// # Errors
    ///
    /// See [`split_fee`].
    pub fn split_fee(&self, total: u64, has_referral: bool) -> Result<FeeBreakdown> {
        split_fee(
            total,
            self.protocol_fee_percent,
            self.partner_fee_percent,
            self.referral_fee_percent,
            self.referral_fee_source,
            has_referral,
        )
    }
}

/// Trading fee on `amount`: `ceil(amount × fee_numerator / FEE_DENOMINATOR)`.
///
/// # Errors
///
/// Returns [`AmmError::ArithmeticOverflow`] if the fee exceeds `u64`.
pub fn fee_on_amount(amount: u64, fee_numerator: u64) -> Result<u64> {
    let fee = mul_div(
        u128::from(amount),
        u128::from(fee_numerator),
        u128::from(FEE_DENOMINATOR),
        Rounding::Up,
    )
    .ok_or(AmmError::ArithmeticOverflow("trading fee"))?;
    u64::try_from(fee).map_err(|_| AmmError::ArithmeticOverflow("trading fee"))
}
