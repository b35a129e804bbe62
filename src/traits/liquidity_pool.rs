//! Liquidity management on top of [`SwapPool`].
//!
//! # Liquidity Accounting Invariant
//!
//! The total reported by [`LiquidityPool::total_liquidity`] only changes
//! through [`LiquidityPool::add_liquidity`] and
//! [`LiquidityPool::remove_liquidity`]:
//!
//! ```text
//! L = Σ (unlocked + vested + permanently locked) over all positions
//! ```
//!
//! # Fee Settlement Ordering
//!
//! Every method that changes a position's liquidity settles the
//! position's fees first, so fees are always measured against the
//! liquidity that earned them. Claiming twice without an intervening swap
//! pays nothing the second time.

use super::SwapPool;
use crate::domain::{Amount, Clock, Liquidity};
use crate::error::Result;
use crate::state::{Position, TokenAmounts};

/// A pool that accepts liquidity from positions.
pub trait LiquidityPool: SwapPool {
    /// Adds `delta` liquidity to `position`.
    ///
    /// Returns the amounts the owner must send. Fails without effect if
    /// either exceeds its threshold.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the implementor.
    fn add_liquidity(
        &mut self,
        position: &mut Position,
        delta: Liquidity,
        max_a: Amount,
        max_b: Amount,
        clock: Clock,
    ) -> Result<TokenAmounts>;

    /// Removes `delta` of the position's unlocked liquidity.
    ///
    /// Returns the amounts the owner receives. Fails without effect if
    /// either is below its minimum.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the implementor.
    fn remove_liquidity(
        &mut self,
        position: &mut Position,
        delta: Liquidity,
        min_a: Amount,
        min_b: Amount,
        clock: Clock,
    ) -> Result<TokenAmounts>;

    /// Pays out the fees `position` has earned.
    ///
    /// # Errors
    ///
    /// Implementation specific; see the implementor.
    fn claim_position_fee(&mut self, position: &mut Position) -> Result<TokenAmounts>;

    /// Active liquidity of the pool.
    #[must_use]
    fn total_liquidity(&self) -> Liquidity;
}
