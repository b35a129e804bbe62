//! Volatility-driven fee surcharge.
//!
//! Price movement is measured in "bins" of `bin_step` basis points. Each
//! swap adds the number of bins crossed since the reference price to a
//! volatility accumulator; the accumulator decays back towards zero when
//! trading pauses. The surcharge grows with the square of the accumulator.

use crate::constants::{BASIS_POINT_MAX, DYNAMIC_FEE_SCALE, MAX_FEE_NUMERATOR};
use crate::domain::Rounding;
use crate::error::{AmmError, Result};
use crate::math::{shl_div, ONE_Q64};

/// Immutable parameters of the dynamic fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DynamicFeeParameters {
    /// Width of one price bin in basis points.
    pub bin_step: u16,
    /// Seconds within which consecutive swaps share a reference price.
    pub filter_period: u16,
    /// Seconds after which volatility is forgotten entirely.
    pub decay_period: u16,
    /// Share of the accumulator kept as reference between the filter and
    /// decay periods, in basis points.
    pub reduction_factor: u16,
    /// Upper bound of the volatility accumulator.
    pub max_volatility_accumulator: u32,
    /// Scale of the surcharge.
    pub variable_fee_control: u32,
    /// Cap on base fee plus surcharge.
    pub max_fee_numerator: u64,
}

impl DynamicFeeParameters {
    /// Checks the parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidFee`] describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.bin_step == 0 {
            return Err(AmmError::InvalidFee("bin step must be positive"));
        }
        if self.filter_period >= self.decay_period {
            return Err(AmmError::InvalidFee("filter period must be shorter than decay period"));
        }
        if u64::from(self.reduction_factor) > BASIS_POINT_MAX {
            return Err(AmmError::InvalidFee("reduction factor above 100%"));
        }
        if self.max_fee_numerator > MAX_FEE_NUMERATOR {
            return Err(AmmError::InvalidFee("dynamic fee cap above maximum fee"));
        }
        Ok(())
    }

    /// Bin width as a Q64.64 price ratio increment.
    fn bin_step_q64(&self) -> Result<u128> {
        shl_div(
            u128::from(self.bin_step),
            u128::from(BASIS_POINT_MAX),
            64,
            Rounding::Down,
        )
        .ok_or(AmmError::DivisionByZero)
    }
}

/// Mutable volatility state carried by a pool with a dynamic fee.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DynamicFeeState {
    /// Volatility accumulated since the reference point, in bins × 10 000.
    pub volatility_accumulator: u128,
    /// Decayed accumulator carried over from earlier activity.
    pub volatility_reference: u128,
    /// Price the bin distance is measured from.
    pub sqrt_price_reference: u128,
    /// Timestamp of the last swap.
    pub last_update_timestamp: u64,
}

impl DynamicFeeState {
    /// Initial state for a pool opening at `sqrt_price`.
    #[must_use]
    pub const fn new(sqrt_price: u128, timestamp: u64) -> Self {
        Self {
            volatility_accumulator: 0,
            volatility_reference: 0,
            sqrt_price_reference: sqrt_price,
            last_update_timestamp: timestamp,
        }
    }

    /// Moves the reference point before a swap.
    ///
    /// Swaps within `filter_period` of the previous one keep the reference.
    /// After that the reference price resets and the accumulator is carried
    /// over at `reduction_factor`, or dropped once `decay_period` passed.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the clock ran backwards.
    pub fn update_references(
        &mut self,
        params: &DynamicFeeParameters,
        sqrt_price: u128,
        timestamp: u64,
    ) -> Result<()> {
        let elapsed = timestamp
            .checked_sub(self.last_update_timestamp)
            .ok_or(AmmError::Underflow("clock before last dynamic fee update"))?;
        if elapsed >= u64::from(params.filter_period) {
            self.sqrt_price_reference = sqrt_price;
            self.volatility_reference = if elapsed < u64::from(params.decay_period) {
                self.volatility_accumulator
                    .checked_mul(u128::from(params.reduction_factor))
                    .ok_or(AmmError::ArithmeticOverflow("volatility reference"))?
                    / u128::from(BASIS_POINT_MAX)
            } else {
                0
            };
        }
        Ok(())
    }

    /// Accumulates the bins crossed between the reference and `sqrt_price`
    /// after a swap and stamps the update time.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the bin distance cannot
    /// be represented.
    pub fn update_volatility_accumulator(
        &mut self,
        params: &DynamicFeeParameters,
        sqrt_price: u128,
        timestamp: u64,
    ) -> Result<()> {
        let delta_bins = delta_bin_id(params.bin_step_q64()?, self.sqrt_price_reference, sqrt_price)?;
        let accumulator = delta_bins
            .checked_mul(u128::from(BASIS_POINT_MAX))
            .and_then(|v| v.checked_add(self.volatility_reference))
            .ok_or(AmmError::ArithmeticOverflow("volatility accumulator"))?;
        self.volatility_accumulator = accumulator.min(u128::from(params.max_volatility_accumulator));
        self.last_update_timestamp = timestamp;
        Ok(())
    }

    /// Surcharge numerator: `ceil((accumulator × bin_step)² × control / 10¹¹)`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the square overflows.
    pub fn variable_fee_numerator(&self, params: &DynamicFeeParameters) -> Result<u64> {
        let overflow = AmmError::ArithmeticOverflow("variable fee");
        let scaled = self
            .volatility_accumulator
            .checked_mul(u128::from(params.bin_step))
            .ok_or(overflow)?;
        let squared = scaled.checked_mul(scaled).ok_or(overflow)?;
        let fee = squared
            .checked_mul(u128::from(params.variable_fee_control))
            .ok_or(overflow)?;
        let fee = Rounding::Up
            .div_u128(fee, DYNAMIC_FEE_SCALE)
            .ok_or(AmmError::DivisionByZero)?;
        u64::try_from(fee).map_err(|_| overflow)
    }
}

/// Number of bins between two prices, doubled because the distance is
/// measured on square roots.
fn delta_bin_id(bin_step_q64: u128, sqrt_price_a: u128, sqrt_price_b: u128) -> Result<u128> {
    let (upper, lower) = if sqrt_price_a > sqrt_price_b {
        (sqrt_price_a, sqrt_price_b)
    } else {
        (sqrt_price_b, sqrt_price_a)
    };
    // A ratio beyond 2^64 already saturates the accumulator cap.
    let ratio = shl_div(upper, lower, 64, Rounding::Down).unwrap_or(u128::MAX);
    let bins = (ratio - ONE_Q64)
        .checked_div(bin_step_q64)
        .ok_or(AmmError::DivisionByZero)?;
    bins.checked_mul(2)
        .ok_or(AmmError::ArithmeticOverflow("bin distance"))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn params() -> DynamicFeeParameters {
        DynamicFeeParameters {
            bin_step: 1,
            filter_period: 10,
            decay_period: 120,
            reduction_factor: 5_000,
            max_volatility_accumulator: 14_460_000,
            variable_fee_control: 1_000_000,
            max_fee_numerator: 100_000_000,
        }
    }

    #[test]
    fn validate_ordering_of_periods() {
        let mut p = params();
        assert_eq!(p.validate(), Ok(()));
        p.decay_period = p.filter_period;
        assert!(p.validate().is_err());
    }

    #[test]
    fn no_movement_no_surcharge() {
        let p = params();
        let mut state = DynamicFeeState::new(ONE_Q64, 0);
        let Ok(()) = state.update_volatility_accumulator(&p, ONE_Q64, 5) else {
            panic!("expected Ok");
        };
        assert_eq!(state.volatility_accumulator, 0);
        assert_eq!(state.variable_fee_numerator(&p), Ok(0));
    }

    #[test]
    fn price_move_builds_volatility() {
        let p = params();
        let mut state = DynamicFeeState::new(ONE_Q64, 0);
        // 1% up on the square root is roughly 2% on price.
        let moved = ONE_Q64 + ONE_Q64 / 100;
        let Ok(()) = state.update_volatility_accumulator(&p, moved, 5) else {
            panic!("expected Ok");
        };
        assert!(state.volatility_accumulator > 0);
        assert_eq!(state.last_update_timestamp, 5);
        let Ok(fee) = state.variable_fee_numerator(&p) else {
            panic!("expected Ok");
        };
        assert!(fee > 0);
    }

    #[test]
    fn accumulator_is_capped() {
        let p = params();
        let mut state = DynamicFeeState::new(ONE_Q64, 0);
        let Ok(()) = state.update_volatility_accumulator(&p, ONE_Q64 * 4, 1) else {
            panic!("expected Ok");
        };
        assert_eq!(state.volatility_accumulator, u128::from(p.max_volatility_accumulator));
    }

    #[test]
    fn references_decay_with_time() {
        let p = params();
        let mut state = DynamicFeeState {
            volatility_accumulator: 10_000,
            volatility_reference: 0,
            sqrt_price_reference: ONE_Q64,
            last_update_timestamp: 100,
        };
        // inside the filter period nothing moves
        let Ok(()) = state.update_references(&p, 2 * ONE_Q64, 105) else {
            panic!("expected Ok");
        };
        assert_eq!(state.sqrt_price_reference, ONE_Q64);
        // between filter and decay the reference keeps half
        let Ok(()) = state.update_references(&p, 2 * ONE_Q64, 150) else {
            panic!("expected Ok");
        };
        assert_eq!(state.sqrt_price_reference, 2 * ONE_Q64);
        assert_eq!(state.volatility_reference, 5_000);
        // after the decay period it is forgotten
        let Ok(()) = state.update_references(&p, 2 * ONE_Q64, 1_000) else {
            panic!("expected Ok");
        };
        assert_eq!(state.volatility_reference, 0);
    }

    #[test]
    fn clock_running_backwards_rejected() {
        let mut state = DynamicFeeState::new(ONE_Q64, 50);
        assert!(state.update_references(&params(), ONE_Q64, 49).is_err());
    }
}
