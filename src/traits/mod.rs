//! Pool behaviour traits.
//!
//! - [`SwapPool`]: swap execution, quotes and fee inspection.
//! - [`LiquidityPool`]: position deposits, withdrawals and fee claims.

mod liquidity_pool;
mod swap_pool;

pub use liquidity_pool::LiquidityPool;
pub use swap_pool::SwapPool;
