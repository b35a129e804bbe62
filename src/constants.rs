//! Protocol-wide numeric constants.
//!
//! Square-root prices are Q64.64 fixed-point numbers and liquidity carries
//! 64 fractional bits, so products of the two are shifted right by
//! [`LIQUIDITY_SCALE`] bits to land back in token units.

/// Fractional bits of a Q64.64 square-root price.
pub const RESOLUTION: u8 = 64;

/// Shift applied to `liquidity × sqrt price delta` and to fee growth.
pub const LIQUIDITY_SCALE: u8 = 128;

/// Fractional bits of a reward emission rate.
pub const REWARD_RATE_SCALE: u8 = 64;

/// Lowest square-root price any pool may trade at.
pub const MIN_SQRT_PRICE: u128 = 4_295_048_016;

/// Highest square-root price any pool may trade at.
pub const MAX_SQRT_PRICE: u128 = 79_226_673_521_066_979_257_578_248_091;

/// Reference liquidity used for bootstrap deposits (`100 << 64`).
pub const MIN_LP_AMOUNT: u128 = 100 << 64;

/// Denominator of every fee numerator.
pub const FEE_DENOMINATOR: u64 = 1_000_000_000;

/// Smallest trading fee numerator a schedule may decay to (0.01%).
pub const MIN_FEE_NUMERATOR: u64 = 100_000;

/// Largest trading fee numerator (50%).
pub const MAX_FEE_NUMERATOR: u64 = 500_000_000;

/// 100% in basis points.
pub const BASIS_POINT_MAX: u64 = 10_000;

/// Number of fee-split percentages that make up 100%.
pub const PERCENT_MAX: u8 = 100;

/// Reward slots per pool.
pub const NUM_REWARDS: usize = 2;

/// Shortest reward emission window (one day).
pub const MIN_REWARD_DURATION: u64 = 86_400;

/// Longest reward emission window (one year).
pub const MAX_REWARD_DURATION: u64 = 31_536_000;

/// Scale of the dynamic variable fee before it becomes a fee numerator.
pub const DYNAMIC_FEE_SCALE: u128 = 100_000_000_000;
