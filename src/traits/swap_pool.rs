//! Swap execution and inspection.
//!
//! [`SwapPool`] covers what a router needs from a pool:
//!
//! 1. **Execute**: [`SwapPool::swap`] performs the exchange.
//! 2. **Simulate**: [`SwapPool::quote`] runs the same computation on a
//!    copy and reports what the swap would do.
//! 3. **Inspect pair**: [`SwapPool::token_pair`].
//! 4. **Inspect fees**: [`SwapPool::current_fee_numerator`].
//!
//! # Fee Invariant
//!
//! The trading fee never leaves the pool with the trader. It is either
//! paid on top of the curve input or withheld from the curve output,
//! depending on the pool's [`CollectFeeMode`](crate::config::CollectFeeMode),
//! and then split between liquidity providers, protocol, partner and
//! referrer.

use crate::domain::{Clock, SwapResult, SwapSpec, TokenPair, TradeDirection};
use crate::error::Result;

/// Core trait of a tradable pool.
///
/// Every method is required. Implementations must be atomic: a failed
/// swap leaves the pool exactly as it was.
pub trait SwapPool {
    /// Executes a swap in `direction`.
    ///
    /// `has_referral` is set when the trader supplied a referrer, which
    /// then receives the referral share of the fee.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the implementor.
    fn swap(
        &mut self,
        direction: TradeDirection,
        spec: SwapSpec,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult>;

    /// Simulates [`swap`](Self::swap) without mutating the pool and
    /// without enforcing the slippage limit in `spec`.
    ///
    /// # Errors
    ///
    /// The same errors as `swap`, except slippage.
    fn quote(
        &self,
        direction: TradeDirection,
        spec: SwapSpec,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult>;

    /// The traded pair. Fixed for the lifetime of the pool.
    #[must_use]
    fn token_pair(&self) -> &TokenPair;

    /// Fee numerator a swap at `clock` would pay, over
    /// [`FEE_DENOMINATOR`](crate::constants::FEE_DENOMINATOR).
    ///
    /// # Errors
    ///
    /// Propagates fee schedule errors.
    fn current_fee_numerator(&self, clock: Clock) -> Result<u64>;
}
