//! Liquidity vesting schedules.
//!
//! A schedule releases `cliff_unlock_liquidity` at `cliff_point` and then
//! `liquidity_per_period` at the end of each of `number_of_period` periods
//! of `period_frequency` points. Released liquidity moves from the
//! position's vested bucket to its unlocked bucket on refresh.

use core::fmt;

use crate::error::{AmmError, Result};

/// Caller-supplied shape of a new vesting schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VestingParameters {
    /// Point at which the cliff tranche unlocks; `None` means the point of
    /// locking, so the cliff is released by the first refresh.
    pub cliff_point: Option<u64>,
    /// Points per period.
    pub period_frequency: u64,
    /// Liquidity released at the cliff.
    pub cliff_unlock_liquidity: u128,
    /// Liquidity released per period after the cliff.
    pub liquidity_per_period: u128,
    /// Number of periods after the cliff.
    pub number_of_period: u16,
}

impl VestingParameters {
    /// Total liquidity the schedule locks.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the total exceeds `u128`.
    pub fn total_lock_amount(&self) -> Result<u128> {
        released_after(
            self.cliff_unlock_liquidity,
            self.liquidity_per_period,
            u64::from(self.number_of_period),
        )
    }

    /// Checks the schedule shape against the current point.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidVestingSchedule`] if the cliff lies in the
    /// past, if periods are requested without a frequency or a per-period
    /// amount, or if the schedule locks nothing.
    pub fn validate(&self, current_point: u64) -> Result<()> {
        if let Some(cliff_point) = self.cliff_point {
            if cliff_point < current_point {
                return Err(AmmError::InvalidVestingSchedule("cliff point in the past"));
            }
        }
        if self.number_of_period > 0 {
            if self.period_frequency == 0 {
                return Err(AmmError::InvalidVestingSchedule("periods need a frequency"));
            }
            if self.liquidity_per_period == 0 {
                return Err(AmmError::InvalidVestingSchedule("periods need liquidity"));
            }
        }
        if self.total_lock_amount()? == 0 {
            return Err(AmmError::InvalidVestingSchedule("schedule locks no liquidity"));
        }
        Ok(())
    }
}

/// Liquidity unlocked once the cliff and `periods` periods have passed.
fn released_after(cliff: u128, per_period: u128, periods: u64) -> Result<u128> {
    per_period
        .checked_mul(u128::from(periods))
        .and_then(|periodic| periodic.checked_add(cliff))
        .ok_or(AmmError::ArithmeticOverflow("vesting total"))
}

/// Where a schedule stands at a given point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VestingState {
    /// The cliff has not been reached.
    Pending,
    /// The cliff has been reached but its tranche is not yet released.
    CliffReleasable,
    /// The cliff tranche is out; periodic tranches remain.
    PeriodReleasing,
    /// Everything has been released.
    Exhausted,
}

impl fmt::Display for VestingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::CliffReleasable => "cliff releasable",
            Self::PeriodReleasing => "period releasing",
            Self::Exhausted => "exhausted",
        };
        f.write_str(name)
    }
}

/// A live vesting schedule owned by a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vesting {
    index: u64,
    cliff_point: u64,
    period_frequency: u64,
    cliff_unlock_liquidity: u128,
    liquidity_per_period: u128,
    number_of_period: u16,
    total_released_liquidity: u128,
}

impl Vesting {
    /// Builds a schedule from validated parameters; an unset cliff becomes
    /// `current_point`.
    pub(crate) fn new(index: u64, params: &VestingParameters, current_point: u64) -> Self {
        Self {
            index,
            cliff_point: params.cliff_point.unwrap_or(current_point),
            period_frequency: params.period_frequency,
            cliff_unlock_liquidity: params.cliff_unlock_liquidity,
            liquidity_per_period: params.liquidity_per_period,
            number_of_period: params.number_of_period,
            total_released_liquidity: 0,
        }
    }

    /// Ordering key, unique per position.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.index
    }

    /// Absolute point of the cliff.
    #[must_use]
    pub const fn cliff_point(&self) -> u64 {
        self.cliff_point
    }

    /// Points per period.
    #[must_use]
    pub const fn period_frequency(&self) -> u64 {
        self.period_frequency
    }

    /// Liquidity released at the cliff.
    #[must_use]
    pub const fn cliff_unlock_liquidity(&self) -> u128 {
        self.cliff_unlock_liquidity
    }

    /// Liquidity released per period.
    #[must_use]
    pub const fn liquidity_per_period(&self) -> u128 {
        self.liquidity_per_period
    }

    /// Number of periods after the cliff.
    #[must_use]
    pub const fn number_of_period(&self) -> u16 {
        self.number_of_period
    }

    /// Liquidity released so far.
    #[must_use]
    pub const fn total_released_liquidity(&self) -> u128 {
        self.total_released_liquidity
    }

    /// Total liquidity the schedule locks.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the total exceeds `u128`,
    /// which validation rules out.
    pub fn total_lock_amount(&self) -> Result<u128> {
        released_after(
            self.cliff_unlock_liquidity,
            self.liquidity_per_period,
            u64::from(self.number_of_period),
        )
    }

    /// Liquidity unlocked by `current_point` in total, released or not.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn max_unlocked_liquidity(&self, current_point: u64) -> Result<u128> {
        if current_point < self.cliff_point {
            return Ok(0);
        }
        let periods = if self.period_frequency == 0 {
            0
        } else {
            ((current_point - self.cliff_point) / self.period_frequency)
                .min(u64::from(self.number_of_period))
        };
        released_after(self.cliff_unlock_liquidity, self.liquidity_per_period, periods)
    }

    /// Liquidity that a refresh at `current_point` would release.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn releasable(&self, current_point: u64) -> Result<u128> {
        let unlocked = self.max_unlocked_liquidity(current_point)?;
        Ok(unlocked.saturating_sub(self.total_released_liquidity))
    }

    /// Lifecycle state at `current_point`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn state(&self, current_point: u64) -> Result<VestingState> {
        if self.is_done()? {
            return Ok(VestingState::Exhausted);
        }
        if current_point < self.cliff_point {
            return Ok(VestingState::Pending);
        }
        if self.total_released_liquidity < self.cliff_unlock_liquidity {
            return Ok(VestingState::CliffReleasable);
        }
        Ok(VestingState::PeriodReleasing)
    }

    /// Records `amount` as released.
    pub(crate) fn accumulate_released(&mut self, amount: u128) -> Result<()> {
        let released = self
            .total_released_liquidity
            .checked_add(amount)
            .ok_or(AmmError::ArithmeticOverflow("vesting released"))?;
        if released > self.total_lock_amount()? {
            return Err(AmmError::InvalidVestingSchedule("release beyond schedule total"));
        }
        self.total_released_liquidity = released;
        Ok(())
    }

    /// `true` once everything has been released.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] on overflow.
    pub fn is_done(&self) -> Result<bool> {
        Ok(self.total_released_liquidity == self.total_lock_amount()?)
    }
}
