//! Mutable engine state: pools, positions and their vesting schedules.
//!
//! A [`Pool`] owns price, liquidity, vault balances, fee accumulators and
//! reward slots. A [`Position`] owns one provider's liquidity buckets, fee
//! and reward checkpoints and [`Vesting`] schedules. Positions are only
//! mutated through pool methods, which stage every change and commit it
//! atomically.

mod metrics;
mod pool;
mod position;
mod reward;
mod vesting;

#[cfg(test)]
#[allow(clippy::panic)]
mod proptest_properties;

pub use metrics::{PoolMetrics, PositionMetrics};
pub use pool::{InitializePoolParameters, Pool, PoolStatus, TokenAmounts};
pub use position::Position;
pub use reward::{RewardInfo, UserRewardInfo};
pub use vesting::{Vesting, VestingParameters, VestingState};
