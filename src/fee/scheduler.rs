//! Time-decaying base fee.

use crate::constants::{BASIS_POINT_MAX, MIN_FEE_NUMERATOR};
use crate::domain::Rounding;
use crate::error::{AmmError, Result};
use crate::fee::DynamicFeeParameters;
use crate::math::{mul_shr, pow_q64, shl_div};

/// Shape of the decay between two periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeeSchedulerMode {
    /// Subtract `reduction_factor` (a fee numerator) each period.
    Linear,
    /// Multiply by `1 − reduction_factor / 10 000` each period.
    Exponential,
}

/// Decay of the cliff fee over `number_of_period` periods of
/// `period_frequency` points each, counted from the pool activation point.
///
/// # Examples
///
/// ```
/// use rangepool::fee::{FeeScheduler, FeeSchedulerMode};
///
/// let scheduler = FeeScheduler {
///     number_of_period: 10,
///     period_frequency: 60,
///     reduction_factor: 1_000_000,
///     mode: FeeSchedulerMode::Linear,
/// };
/// assert_eq!(scheduler.elapsed_periods(1_000 + 125, 1_000), 2);
/// assert_eq!(scheduler.fee_numerator(50_000_000, 2), Ok(48_000_000));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FeeScheduler {
    /// Periods after which the fee stops decaying.
    pub number_of_period: u16,
    /// Points per period.
    pub period_frequency: u64,
    /// Per-period reduction: a fee numerator (linear) or basis points
    /// (exponential).
    pub reduction_factor: u64,
    /// Decay shape.
    pub mode: FeeSchedulerMode,
}

impl FeeScheduler {
    /// Whole periods elapsed at `current_point`, capped at
    /// `number_of_period`. Before activation the fee is fully decayed, so
    /// quotes taken early show the floor rate.
    #[must_use]
    pub fn elapsed_periods(&self, current_point: u64, activation_point: u64) -> u64 {
        let max_periods = u64::from(self.number_of_period);
        if current_point < activation_point {
            return max_periods;
        }
        if self.period_frequency == 0 {
            return 0;
        }
        ((current_point - activation_point) / self.period_frequency).min(max_periods)
    }

    /// Fee numerator after `periods` decay steps.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if a linear schedule decays below
    /// zero and [`AmmError::ArithmeticOverflow`] if the exponential factor
    /// cannot be represented.
    pub fn fee_numerator(&self, cliff_fee_numerator: u64, periods: u64) -> Result<u64> {
        let periods = periods.min(u64::from(self.number_of_period));
        match self.mode {
            FeeSchedulerMode::Linear => {
                let reduction = periods
                    .checked_mul(self.reduction_factor)
                    .ok_or(AmmError::ArithmeticOverflow("linear fee reduction"))?;
                cliff_fee_numerator
                    .checked_sub(reduction)
                    .ok_or(AmmError::Underflow("linear fee decayed below zero"))
            }
            FeeSchedulerMode::Exponential => {
                let retained_bps = BASIS_POINT_MAX
                    .checked_sub(self.reduction_factor)
                    .ok_or(AmmError::InvalidFee("reduction factor above 100%"))?;
                let base = shl_div(
                    u128::from(retained_bps),
                    u128::from(BASIS_POINT_MAX),
                    64,
                    Rounding::Down,
                )
                .ok_or(AmmError::DivisionByZero)?;
                let exponent = u32::try_from(periods)
                    .map_err(|_| AmmError::ArithmeticOverflow("fee period count"))?;
                let factor = pow_q64(base, exponent)
                    .ok_or(AmmError::ArithmeticOverflow("fee decay factor"))?;
                let fee = mul_shr(u128::from(cliff_fee_numerator), factor, 64)
                    .ok_or(AmmError::ArithmeticOverflow("fee decay"))?;
                u64::try_from(fee).map_err(|_| AmmError::ArithmeticOverflow("fee decay"))
            }
        }
    }

    /// Checks the schedule against its cliff fee.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] for a schedule with periods but no
    /// frequency or reduction, an exponential reduction of 100% or more,
    /// or a floor below [`MIN_FEE_NUMERATOR`].
    pub fn validate(&self, cliff_fee_numerator: u64) -> Result<()> {
        if self.number_of_period == 0 {
            return Ok(());
        }
        if self.period_frequency == 0 {
            return Err(AmmError::InvalidFee("decaying fee needs a period frequency"));
        }
        if self.reduction_factor == 0 {
            return Err(AmmError::InvalidFee("decaying fee needs a reduction factor"));
        }
        if self.mode == FeeSchedulerMode::Exponential && self.reduction_factor >= BASIS_POINT_MAX {
            return Err(AmmError::InvalidFee("exponential reduction must be below 100%"));
        }
        let floor = self
            .fee_numerator(cliff_fee_numerator, u64::from(self.number_of_period))
            .map_err(|_| AmmError::InvalidFee("fee schedule decays below zero"))?;
        if floor < MIN_FEE_NUMERATOR {
            return Err(AmmError::InvalidFee("fee schedule decays below the minimum fee"));
        }
        Ok(())
    }
}

/// How the base fee varies over the pool's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeeModifier {
    /// The cliff fee applies for ever.
    #[default]
    None,
    /// The cliff fee decays on a schedule.
    Decay(FeeScheduler),
    /// A volatility-driven surcharge is added to the cliff fee.
    Dynamic(DynamicFeeParameters),
}

/// Base fee numerator after `elapsed_periods` of decay.
///
/// Only [`FeeModifier::Decay`] changes the cliff fee; the dynamic surcharge
/// is added separately because it depends on pool state.
///
/// # Errors
///
/// Propagates [`FeeScheduler::fee_numerator`] errors.
pub fn current_base_fee_rate(
    cliff_fee_numerator: u64,
    modifier: &FeeModifier,
    elapsed_periods: u64,
) -> Result<u64> {
    match modifier {
        FeeModifier::None | FeeModifier::Dynamic(_) => Ok(cliff_fee_numerator),
        FeeModifier::Decay(scheduler) => scheduler.fee_numerator(cliff_fee_numerator, elapsed_periods),
    }
}
