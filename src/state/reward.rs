//! Liquidity mining rewards.
//!
//! Each reward slot streams a funded amount linearly over `reward_duration`
//! seconds. Emission is shared by liquidity in proportion to its size via
//! `reward_per_token_stored`, scaled by 2¹⁹²: 2⁶⁴ from the Q64 emission
//! rate and 2¹²⁸ from the liquidity scale. Seconds during which the pool
//! had no liquidity are counted so the funder can reclaim that emission.

use ruint::aliases::U256;

use crate::constants::{LIQUIDITY_SCALE, REWARD_RATE_SCALE};
use crate::domain::{Address, Rounding};
use crate::error::{AmmError, Result};
use crate::math::{mul_shr, shl_div};

const POSITION_REWARD_SHIFT: usize = LIQUIDITY_SCALE as usize + REWARD_RATE_SCALE as usize;

/// State of one reward slot of a pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RewardInfo {
    /// Whether the slot has been set up.
    pub initialized: bool,
    /// Reward token.
    pub mint: Address,
    /// Account allowed to fund the slot.
    pub funder: Address,
    /// Emission window length in seconds.
    pub reward_duration: u64,
    /// End of the current emission window.
    pub reward_duration_end: u64,
    /// Emission per second, Q64.64.
    pub reward_rate: u128,
    /// Reward per unit of liquidity since initialization, scaled by 2¹⁹².
    pub reward_per_token_stored: U256,
    /// Last time the slot was brought up to date.
    pub last_update_time: u64,
    /// Emission seconds during which the pool had no liquidity.
    pub cumulative_seconds_with_empty_liquidity_reward: u64,
}

impl RewardInfo {
    /// Emission already paid for but not yet distributed.
    fn remaining_emission(&self, current_time: u64) -> Result<u64> {
        if current_time >= self.reward_duration_end {
            return Ok(0);
        }
        let seconds = self.reward_duration_end - current_time;
        let left = mul_shr(self.reward_rate, u128::from(seconds), REWARD_RATE_SCALE)
            .ok_or(AmmError::ArithmeticOverflow("reward leftover"))?;
        u64::try_from(left).map_err(|_| AmmError::ArithmeticOverflow("reward leftover"))
    }

    /// Brings the accumulator up to `current_time` for `liquidity`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the accumulator overflows.
    pub fn update(&mut self, liquidity: u128, current_time: u64) -> Result<()> {
        if !self.initialized {
            return Ok(());
        }
        let applicable = current_time.min(self.reward_duration_end);
        let elapsed = applicable.saturating_sub(self.last_update_time);
        if elapsed > 0 {
            if liquidity == 0 {
                self.cumulative_seconds_with_empty_liquidity_reward = self
                    .cumulative_seconds_with_empty_liquidity_reward
                    .checked_add(elapsed)
                    .ok_or(AmmError::ArithmeticOverflow("empty liquidity seconds"))?;
            } else {
                let emitted = U256::from(self.reward_rate)
                    .checked_mul(U256::from(elapsed))
                    .and_then(|v| v.checked_shl(usize::from(LIQUIDITY_SCALE)))
                    .ok_or(AmmError::ArithmeticOverflow("reward emission"))?;
                let delta = emitted / U256::from(liquidity);
                self.reward_per_token_stored = self
                    .reward_per_token_stored
                    .checked_add(delta)
                    .ok_or(AmmError::ArithmeticOverflow("reward per token"))?;
            }
        }
        self.last_update_time = self.last_update_time.max(applicable);
        Ok(())
    }

    /// Adds `amount` to the slot and restarts the emission window at
    /// `current_time`, carrying over what had not been emitted yet.
    ///
    /// The accumulator must already be up to date.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the new rate overflows.
    pub fn apply_funding(&mut self, amount: u64, current_time: u64) -> Result<()> {
        let total = self
            .remaining_emission(current_time)?
            .checked_add(amount)
            .ok_or(AmmError::ArithmeticOverflow("reward funding"))?;
        self.reward_rate = shl_div(
            u128::from(total),
            u128::from(self.reward_duration),
            REWARD_RATE_SCALE,
            Rounding::Down,
        )
        .ok_or(AmmError::DivisionByZero)?;
        self.last_update_time = current_time;
        self.reward_duration_end = current_time
            .checked_add(self.reward_duration)
            .ok_or(AmmError::ArithmeticOverflow("reward end"))?;
        Ok(())
    }

    /// Emission that fell on empty liquidity; resets the counter.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn take_ineligible_reward(&mut self) -> Result<u64> {
        let seconds = self.cumulative_seconds_with_empty_liquidity_reward;
        let amount = mul_shr(self.reward_rate, u128::from(seconds), REWARD_RATE_SCALE)
            .ok_or(AmmError::ArithmeticOverflow("ineligible reward"))?;
        let amount = u64::try_from(amount).map_err(|_| AmmError::ArithmeticOverflow("ineligible reward"))?;
        self.cumulative_seconds_with_empty_liquidity_reward = 0;
        Ok(amount)
    }
}

/// A position's view of one reward slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserRewardInfo {
    /// `reward_per_token_stored` at the last settlement.
    pub reward_per_token_checkpoint: U256,
    /// Settled but unclaimed reward.
    pub reward_pending: u64,
    /// Rewards claimed over the position's lifetime.
    pub total_claimed_rewards: u64,
}

impl UserRewardInfo {
    /// Credits the reward earned by `liquidity` since the checkpoint.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the checkpoint is ahead of the
    /// pool and [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn settle(&mut self, reward_per_token_stored: U256, liquidity: u128) -> Result<()> {
        let delta = reward_per_token_stored
            .checked_sub(self.reward_per_token_checkpoint)
            .ok_or(AmmError::Underflow("reward checkpoint ahead of pool"))?;
        let earned = delta
            .checked_mul(U256::from(liquidity))
            .ok_or(AmmError::ArithmeticOverflow("position reward"))?
            >> POSITION_REWARD_SHIFT;
        let earned = u64::try_from(earned).map_err(|_| AmmError::ArithmeticOverflow("position reward"))?;
        self.reward_pending = self
            .reward_pending
            .checked_add(earned)
            .ok_or(AmmError::ArithmeticOverflow("position reward"))?;
        self.reward_per_token_checkpoint = reward_per_token_stored;
        Ok(())
    }

    /// Takes the pending reward.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the lifetime total
    /// overflows.
    pub fn take_pending(&mut self) -> Result<u64> {
        let amount = self.reward_pending;
        self.total_claimed_rewards = self
            .total_claimed_rewards
            .checked_add(amount)
            .ok_or(AmmError::ArithmeticOverflow("claimed rewards"))?;
        self.reward_pending = 0;
        Ok(amount)
    }
}
