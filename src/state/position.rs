//! Liquidity provider positions.

use std::collections::BTreeMap;

use super::reward::{RewardInfo, UserRewardInfo};
use super::vesting::Vesting;
use super::metrics::PositionMetrics;
use crate::constants::NUM_REWARDS;
use crate::domain::{Address, Liquidity};
use crate::error::{AmmError, Result};
use crate::fee::FeeGrowth;
use crate::math::CheckedArithmetic;

/// A liquidity provider's claim on a pool.
///
/// Liquidity sits in three buckets:
///
/// - **unlocked**: withdrawable, and lockable into a vesting schedule;
/// - **vested**: locked in vesting schedules, released back to unlocked
///   over time;
/// - **permanently locked**: never withdrawable.
///
/// All three earn fees and rewards. Positions are created by
/// [`Pool::create_position`](super::Pool::create_position) or
/// [`Pool::initialize`](super::Pool::initialize) and only mutated through
/// pool methods.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Position {
    pool: Address,
    owner: Address,
    unlocked_liquidity: Liquidity,
    vested_liquidity: Liquidity,
    permanent_locked_liquidity: Liquidity,
    pub(crate) fee_checkpoint: FeeGrowth,
    pub(crate) fee_a_owed: u64,
    pub(crate) fee_b_owed: u64,
    vestings: BTreeMap<u64, Vesting>,
    reward_infos: [UserRewardInfo; NUM_REWARDS],
    metrics: PositionMetrics,
}

impl Position {
    pub(crate) fn new(
        pool: Address,
        owner: Address,
        fee_checkpoint: FeeGrowth,
        rewards: &[RewardInfo; NUM_REWARDS],
    ) -> Self {
        let reward_infos = rewards.map(|reward| UserRewardInfo {
            reward_per_token_checkpoint: reward.reward_per_token_stored,
            ..UserRewardInfo::default()
        });
        Self {
            pool,
            owner,
            unlocked_liquidity: Liquidity::ZERO,
            vested_liquidity: Liquidity::ZERO,
            permanent_locked_liquidity: Liquidity::ZERO,
            fee_checkpoint,
            fee_a_owed: 0,
            fee_b_owed: 0,
            vestings: BTreeMap::new(),
            reward_infos,
            metrics: PositionMetrics::default(),
        }
    }

    /// Pool the position belongs to.
    #[must_use]
    pub const fn pool(&self) -> Address {
        self.pool
    }

    /// Owner of the position.
    #[must_use]
    pub const fn owner(&self) -> Address {
        self.owner
    }

    /// Withdrawable liquidity.
    #[must_use]
    pub const fn unlocked_liquidity(&self) -> Liquidity {
        self.unlocked_liquidity
    }

    /// Liquidity held by vesting schedules.
    #[must_use]
    pub const fn vested_liquidity(&self) -> Liquidity {
        self.vested_liquidity
    }

    /// Liquidity that can never be withdrawn.
    #[must_use]
    pub const fn permanent_locked_liquidity(&self) -> Liquidity {
        self.permanent_locked_liquidity
    }

    /// Sum of all three buckets.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the sum overflows.
    pub fn total_liquidity(&self) -> Result<Liquidity> {
        self.unlocked_liquidity
            .safe_add(&self.vested_liquidity)?
            .safe_add(&self.permanent_locked_liquidity)
    }

    /// Settled, unclaimed token A fees.
    #[must_use]
    pub const fn fee_a_owed(&self) -> u64 {
        self.fee_a_owed
    }

    /// Settled, unclaimed token B fees.
    #[must_use]
    pub const fn fee_b_owed(&self) -> u64 {
        self.fee_b_owed
    }

    /// Fee growth at the last settlement.
    #[must_use]
    pub const fn fee_checkpoint(&self) -> &FeeGrowth {
        &self.fee_checkpoint
    }

    /// Live vesting schedules in index order.
    pub fn vestings(&self) -> impl Iterator<Item = &Vesting> {
        self.vestings.values()
    }

    /// The live schedule with `index`, if any.
    #[must_use]
    pub fn vesting(&self, index: u64) -> Option<&Vesting> {
        self.vestings.get(&index)
    }

    /// Reward bookkeeping for slot `index`.
    #[must_use]
    pub fn reward_info(&self, index: usize) -> Option<&UserRewardInfo> {
        self.reward_infos.get(index)
    }

    /// Lifetime fee claims.
    #[must_use]
    pub const fn metrics(&self) -> &PositionMetrics {
        &self.metrics
    }

    pub(crate) fn add_unlocked(&mut self, delta: Liquidity) -> Result<()> {
        self.unlocked_liquidity = self.unlocked_liquidity.safe_add(&delta)?;
        Ok(())
    }

    pub(crate) fn remove_unlocked(&mut self, delta: Liquidity) -> Result<()> {
        if delta > self.unlocked_liquidity {
            return Err(AmmError::InsufficientUnlockedLiquidity);
        }
        self.unlocked_liquidity = self.unlocked_liquidity.safe_sub(&delta)?;
        Ok(())
    }

    /// Moves the schedule's total from unlocked to vested and stores it.
    pub(crate) fn insert_vesting(&mut self, vesting: Vesting) -> Result<()> {
        if self.vestings.contains_key(&vesting.index()) {
            return Err(AmmError::DuplicateVestingIndex(vesting.index()));
        }
        let amount = Liquidity::new(vesting.total_lock_amount()?);
        if amount > self.unlocked_liquidity {
            return Err(AmmError::InsufficientUnlockedLiquidity);
        }
        self.unlocked_liquidity = self.unlocked_liquidity.safe_sub(&amount)?;
        self.vested_liquidity = self.vested_liquidity.safe_add(&amount)?;
        self.vestings.insert(vesting.index(), vesting);
        Ok(())
    }

    /// Releases whatever schedule `index` has unlocked by `current_point`,
    /// dropping the schedule once it is exhausted. Returns the released
    /// liquidity.
    pub(crate) fn release_vesting(&mut self, index: u64, current_point: u64) -> Result<Liquidity> {
        let vesting = self
            .vestings
            .get_mut(&index)
            .ok_or(AmmError::VestingNotFound(index))?;
        let released = vesting.releasable(current_point)?;
        vesting.accumulate_released(released)?;
        let exhausted = vesting.is_done()?;
        if exhausted {
            self.vestings.remove(&index);
        }
        let released = Liquidity::new(released);
        self.vested_liquidity = self.vested_liquidity.safe_sub(&released)?;
        self.unlocked_liquidity = self.unlocked_liquidity.safe_add(&released)?;
        Ok(released)
    }

    /// Moves all unlocked liquidity into the permanent bucket.
    pub(crate) fn permanent_lock_unlocked(&mut self) -> Result<Liquidity> {
        let amount = self.unlocked_liquidity;
        if amount.is_zero() {
            return Err(AmmError::NothingToLock);
        }
        self.permanent_locked_liquidity = self.permanent_locked_liquidity.safe_add(&amount)?;
        self.unlocked_liquidity = Liquidity::ZERO;
        Ok(amount)
    }

    /// Settles every reward slot against the pool's accumulators.
    pub(crate) fn update_rewards(&mut self, rewards: &[RewardInfo; NUM_REWARDS]) -> Result<()> {
        let liquidity = self.total_liquidity()?.get();
        for (user, reward) in self.reward_infos.iter_mut().zip(rewards.iter()) {
            if reward.initialized {
                user.settle(reward.reward_per_token_stored, liquidity)?;
            }
        }
        Ok(())
    }

    pub(crate) fn take_reward(&mut self, index: usize) -> Result<u64> {
        self.reward_infos
            .get_mut(index)
            .ok_or(AmmError::InvalidReward("reward index out of range"))?
            .take_pending()
    }

    /// Takes both owed fee balances.
    pub(crate) fn take_fees(&mut self) -> Result<(u64, u64)> {
        let owed = (self.fee_a_owed, self.fee_b_owed);
        self.metrics.record_claim(owed.0, owed.1)?;
        self.fee_a_owed = 0;
        self.fee_b_owed = 0;
        Ok(owed)
    }
}
