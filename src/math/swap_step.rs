//! Single-step swap solver.
//!
//! A step moves the price from `current` towards `target` (never past it)
//! and reports how much was paid in, paid out and taken as fee. The pool
//! calls it repeatedly until the request is filled or the price bound is
//! reached.

use ruint::aliases::U256;

use super::curve::{
    delta_amount_a_wide, delta_amount_b_wide, get_delta_amount_a, get_delta_amount_b,
    get_next_sqrt_price_from_input, get_next_sqrt_price_from_output,
};
use super::fixed_point::mul_div;
use crate::constants::FEE_DENOMINATOR;
use crate::domain::{Rounding, SwapMode};
use crate::error::{AmmError, Result};
use crate::fee::fee_on_amount;

/// Which amount of a step the trading fee is deducted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeeSide {
    /// The fee is paid on top of what enters the curve.
    Input,
    /// The fee is withheld from what leaves the curve.
    Output,
}

/// Result of one swap step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SwapStep {
    /// Price at the end of the step.
    pub next_sqrt_price: u128,
    /// Amount the trader pays, fee included when the fee is on input.
    pub amount_in: u64,
    /// Amount the trader receives, net of the fee when it is on output.
    pub amount_out: u64,
    /// Trading fee taken by the step.
    pub fee_amount: u64,
}

/// Fee owed on top of `net` so that the fee is `fee_numerator` of the gross.
fn fee_on_net(net: u64, fee_numerator: u64) -> Result<u64> {
    let fee = mul_div(
        u128::from(net),
        u128::from(fee_numerator),
        u128::from(FEE_DENOMINATOR - fee_numerator),
        Rounding::Up,
    )
    .ok_or(AmmError::ArithmeticOverflow("trading fee"))?;
    u64::try_from(fee).map_err(|_| AmmError::ArithmeticOverflow("trading fee"))
}

fn gross_for_net(net: u64, fee_numerator: u64) -> Result<U256> {
    let gross = mul_div(
        u128::from(net),
        u128::from(FEE_DENOMINATOR),
        u128::from(FEE_DENOMINATOR - fee_numerator),
        Rounding::Up,
    )
    .ok_or(AmmError::ArithmeticOverflow("gross output"))?;
    Ok(U256::from(gross))
}

struct Segment {
    current: u128,
    liquidity: u128,
    a_for_b: bool,
}

impl Segment {
    /// Curve input between `current` and `price`.
    fn input_to(&self, price: u128, rounding: Rounding) -> Result<u64> {
        if self.a_for_b {
            get_delta_amount_a(price, self.current, self.liquidity, rounding)
        } else {
            get_delta_amount_b(self.current, price, self.liquidity, rounding)
        }
    }

    /// Curve output between `current` and `price`.
    fn output_to(&self, price: u128, rounding: Rounding) -> Result<u64> {
        if self.a_for_b {
            get_delta_amount_b(price, self.current, self.liquidity, rounding)
        } else {
            get_delta_amount_a(self.current, price, self.liquidity, rounding)
        }
    }

    fn input_to_wide(&self, price: u128) -> Result<U256> {
        if self.a_for_b {
            delta_amount_a_wide(price, self.current, self.liquidity, Rounding::Up)
        } else {
            delta_amount_b_wide(self.current, price, self.liquidity, Rounding::Up)
        }
    }

    fn output_to_wide(&self, price: u128) -> Result<U256> {
        if self.a_for_b {
            delta_amount_b_wide(price, self.current, self.liquidity, Rounding::Down)
        } else {
            delta_amount_a_wide(self.current, price, self.liquidity, Rounding::Down)
        }
    }
}

/// Computes one bounded step of a swap.
///
/// `target` lies below `current` for an A→B swap and above it for B→A.
/// `amount_remaining` is the unfilled input (exact-in) or the unfilled
/// output (exact-out). `fee_numerator` is over
/// [`FEE_DENOMINATOR`](crate::constants::FEE_DENOMINATOR).
///
/// # Errors
///
/// - [`AmmError::PriceLimitReached`] if `current == target` while an amount
///   remains.
/// - [`AmmError::InsufficientLiquidity`] if `liquidity` is zero.
/// - [`AmmError::InvalidFee`] if the fee is not below 100%.
/// - [`AmmError::ArithmeticOverflow`] if an amount leaves the `u64` domain.
pub fn compute_swap_step(
    current: u128,
    target: u128,
    liquidity: u128,
    amount_remaining: u64,
    fee_numerator: u64,
    mode: SwapMode,
    fee_side: FeeSide,
) -> Result<SwapStep> {
    if amount_remaining == 0 {
        return Ok(SwapStep {
            next_sqrt_price: current,
            ..SwapStep::default()
        });
    }
    if current == target {
        return Err(AmmError::PriceLimitReached);
    }
    if liquidity == 0 {
        return Err(AmmError::InsufficientLiquidity);
    }
    if fee_numerator >= FEE_DENOMINATOR {
        return Err(AmmError::InvalidFee("fee must be below 100%"));
    }
    let segment = Segment {
        current,
        liquidity,
        a_for_b: target < current,
    };
    match (mode, fee_side) {
        (SwapMode::ExactIn, FeeSide::Input) => {
            exact_in_fee_on_input(&segment, target, amount_remaining, fee_numerator)
        }
        (SwapMode::ExactIn, FeeSide::Output) => {
            exact_in_fee_on_output(&segment, target, amount_remaining, fee_numerator)
        }
        (SwapMode::ExactOut, FeeSide::Input) => {
            exact_out_fee_on_input(&segment, target, amount_remaining, fee_numerator)
        }
        (SwapMode::ExactOut, FeeSide::Output) => {
            exact_out_fee_on_output(&segment, target, amount_remaining, fee_numerator)
        }
    }
}

fn exact_in_fee_on_input(
    segment: &Segment,
    target: u128,
    amount_remaining: u64,
    fee_numerator: u64,
) -> Result<SwapStep> {
    let fee_on_remaining = fee_on_amount(amount_remaining, fee_numerator)?;
    let less_fee = amount_remaining - fee_on_remaining;
    let max_in = segment.input_to_wide(target)?;
    let less_fee_wide = U256::from(less_fee);

    let (next_sqrt_price, amount_in, fee_amount) = if less_fee_wide > max_in {
        // Fills the segment with input to spare.
        let curve_in = u64::try_from(max_in).map_err(|_| AmmError::ArithmeticOverflow("curve input"))?;
        let fee = fee_on_net(curve_in, fee_numerator)?.min(amount_remaining - curve_in);
        (target, curve_in + fee, fee)
    } else if less_fee_wide == max_in {
        (target, amount_remaining, fee_on_remaining)
    } else {
        let next = get_next_sqrt_price_from_input(
            segment.current,
            segment.liquidity,
            less_fee,
            segment.a_for_b,
        )?;
        (next, amount_remaining, fee_on_remaining)
    };
    let amount_out = segment.output_to(next_sqrt_price, Rounding::Down)?;
    Ok(SwapStep {
        next_sqrt_price,
        amount_in,
        amount_out,
        fee_amount,
    })
}

fn exact_in_fee_on_output(
    segment: &Segment,
    target: u128,
    amount_remaining: u64,
    fee_numerator: u64,
) -> Result<SwapStep> {
    let max_in = segment.input_to_wide(target)?;
    let (next_sqrt_price, amount_in) = if U256::from(amount_remaining) >= max_in {
        let curve_in = u64::try_from(max_in).map_err(|_| AmmError::ArithmeticOverflow("curve input"))?;
        (target, curve_in)
    } else {
        let next = get_next_sqrt_price_from_input(
            segment.current,
            segment.liquidity,
            amount_remaining,
            segment.a_for_b,
        )?;
        (next, amount_remaining)
    };
    let gross_out = segment.output_to(next_sqrt_price, Rounding::Down)?;
    let fee_amount = fee_on_amount(gross_out, fee_numerator)?;
    Ok(SwapStep {
        next_sqrt_price,
        amount_in,
        amount_out: gross_out - fee_amount,
        fee_amount,
    })
}

fn exact_out_fee_on_input(
    segment: &Segment,
    target: u128,
    amount_remaining: u64,
    fee_numerator: u64,
) -> Result<SwapStep> {
    let max_out = segment.output_to_wide(target)?;
    let (next_sqrt_price, amount_out) = if U256::from(amount_remaining) >= max_out {
        let out = u64::try_from(max_out).map_err(|_| AmmError::ArithmeticOverflow("curve output"))?;
        (target, out)
    } else {
        let next = get_next_sqrt_price_from_output(
            segment.current,
            segment.liquidity,
            amount_remaining,
            segment.a_for_b,
        )?;
        (next, amount_remaining)
    };
    let curve_in = segment.input_to(next_sqrt_price, Rounding::Up)?;
    let fee_amount = fee_on_net(curve_in, fee_numerator)?;
    let amount_in = curve_in
        .checked_add(fee_amount)
        .ok_or(AmmError::ArithmeticOverflow("swap input"))?;
    Ok(SwapStep {
        next_sqrt_price,
        amount_in,
        amount_out,
        fee_amount,
    })
}

fn exact_out_fee_on_output(
    segment: &Segment,
    target: u128,
    amount_remaining: u64,
    fee_numerator: u64,
) -> Result<SwapStep> {
    let max_out = segment.output_to_wide(target)?;
    let gross_needed = gross_for_net(amount_remaining, fee_numerator)?;
    let (next_sqrt_price, amount_out, fee_amount) = if gross_needed >= max_out {
        let gross = u64::try_from(max_out).map_err(|_| AmmError::ArithmeticOverflow("curve output"))?;
        let fee = fee_on_amount(gross, fee_numerator)?;
        (target, gross - fee, fee)
    } else {
        // gross_needed < max_out, so it fits in u64.
        let gross = u64::try_from(gross_needed).map_err(|_| AmmError::ArithmeticOverflow("gross output"))?;
        let next = get_next_sqrt_price_from_output(
            segment.current,
            segment.liquidity,
            gross,
            segment.a_for_b,
        )?;
        (next, amount_remaining, gross - amount_remaining)
    };
    let amount_in = segment.input_to(next_sqrt_price, Rounding::Up)?;
    Ok(SwapStep {
        next_sqrt_price,
        amount_in,
        amount_out,
        fee_amount,
    })
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::math::ONE_Q64;

    const LIQUIDITY: u128 = ONE_Q64 * 1_000_000;
    const FEE: u64 = 10_000_000; // 1%

    #[test]
    fn same_price_with_amount_is_limit() {
        assert_eq!(
            compute_swap_step(ONE_Q64, ONE_Q64, LIQUIDITY, 1, FEE, SwapMode::ExactIn, FeeSide::Input),
            Err(AmmError::PriceLimitReached)
        );
    }

    #[test]
    fn zero_liquidity_rejected() {
        assert_eq!(
            compute_swap_step(ONE_Q64, ONE_Q64 / 2, 0, 1, FEE, SwapMode::ExactIn, FeeSide::Input),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn nothing_remaining_is_noop() {
        let Ok(step) =
            compute_swap_step(ONE_Q64, ONE_Q64 / 2, LIQUIDITY, 0, FEE, SwapMode::ExactIn, FeeSide::Input)
        else {
            panic!("expected Ok");
        };
        assert_eq!(step.next_sqrt_price, ONE_Q64);
        assert_eq!(step.amount_in, 0);
    }

    #[test]
    fn exact_in_partial_consumes_everything() {
        let Ok(step) =
            compute_swap_step(ONE_Q64, ONE_Q64 / 2, LIQUIDITY, 1_000, FEE, SwapMode::ExactIn, FeeSide::Input)
        else {
            panic!("expected Ok");
        };
        assert_eq!(step.amount_in, 1_000);
        assert_eq!(step.fee_amount, 10);
        assert!(step.next_sqrt_price < ONE_Q64 && step.next_sqrt_price > ONE_Q64 / 2);
        // price is ~1, so 990 A buys a little less than 990 B
        assert!(step.amount_out <= 990 && step.amount_out >= 980);
    }

    #[test]
    fn input_fee_matches_pool_fee_rounding() {
        for amount in [100u64, 1_001, 123_456_789] {
            let Ok(step) =
                compute_swap_step(ONE_Q64, ONE_Q64 / 2, LIQUIDITY, amount, FEE, SwapMode::ExactIn, FeeSide::Input)
            else {
                panic!("expected Ok");
            };
            assert_eq!(Ok(step.fee_amount), fee_on_amount(amount, FEE));
        }
    }

    #[test]
    fn exact_in_stops_at_target() {
        let target = ONE_Q64 - ONE_Q64 / 1_000_000;
        let Ok(step) = compute_swap_step(
            ONE_Q64,
            target,
            LIQUIDITY,
            u64::MAX / 2,
            FEE,
            SwapMode::ExactIn,
            FeeSide::Input,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(step.next_sqrt_price, target);
        assert!(step.amount_in < u64::MAX / 2);
    }

    #[test]
    fn exact_in_fee_on_output() {
        let Ok(step) =
            compute_swap_step(ONE_Q64, 2 * ONE_Q64, LIQUIDITY, 1_000, FEE, SwapMode::ExactIn, FeeSide::Output)
        else {
            panic!("expected Ok");
        };
        assert_eq!(step.amount_in, 1_000);
        assert!(step.next_sqrt_price > ONE_Q64);
        assert!(step.fee_amount >= 9);
    }

    #[test]
    fn exact_out_delivers_request() {
        for side in [FeeSide::Input, FeeSide::Output] {
            let Ok(step) =
                compute_swap_step(ONE_Q64, ONE_Q64 / 2, LIQUIDITY, 500, FEE, SwapMode::ExactOut, side)
            else {
                panic!("expected Ok");
            };
            assert_eq!(step.amount_out, 500);
            assert!(step.amount_in > 500);
            assert!(step.fee_amount > 0);
        }
    }

    #[test]
    fn exact_out_capped_by_segment() {
        let target = ONE_Q64 - ONE_Q64 / 1_000_000;
        let Ok(step) = compute_swap_step(
            ONE_Q64,
            target,
            LIQUIDITY,
            1_000_000,
            FEE,
            SwapMode::ExactOut,
            FeeSide::Input,
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(step.next_sqrt_price, target);
        assert!(step.amount_out < 1_000_000);
    }

    #[test]
    fn full_fee_rejected() {
        assert!(matches!(
            compute_swap_step(ONE_Q64, ONE_Q64 / 2, LIQUIDITY, 1, FEE_DENOMINATOR, SwapMode::ExactIn, FeeSide::Input),
            Err(AmmError::InvalidFee(_))
        ));
    }
}
