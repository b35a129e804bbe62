//! Fixed-point arithmetic for the pool curve.
//!
//! - Wide-integer helpers widen to 256/512 bits and narrow back
//!   with explicit rounding.
//! - Curve functions convert between token amounts, liquidity and Q64.64
//!   square-root prices.
//! - [`compute_swap_step`] solves one bounded price movement of a swap.
//! - [`CheckedArithmetic`] gives domain wrappers error-returning add/sub.

mod checked;
mod curve;
mod fixed_point;
mod swap_step;

pub use checked::CheckedArithmetic;
pub use curve::{
    amounts_from_liquidity, get_delta_amount_a, get_delta_amount_b, get_initialize_amounts,
    get_next_sqrt_price_from_input, get_next_sqrt_price_from_output, liquidity_from_amount_a,
    liquidity_from_amount_b, liquidity_from_amounts, sqrt_price_from_ratio,
};
pub use fixed_point::{
    div_rounding_u256, mul_div, mul_shr, mul_shr_256, pow_q64, shl_div, shl_div_256, sqrt_u256,
    ONE_Q64,
};
pub use swap_step::{compute_swap_step, FeeSide, SwapStep};
