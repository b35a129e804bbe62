//! Unified error types for the pool engine.
//!
//! All fallible operations across the crate return [`AmmError`] as their
//! error type. Every rejection happens before any state is committed, so a
//! caller that receives an error can assume the pool, position and vesting
//! schedules are exactly as they were before the call.

use thiserror::Error;

/// Errors produced by configuration, math, fee and pool operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AmmError {
    /// A configuration value is out of range or inconsistent.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(&'static str),

    /// A fee parameter is out of range.
    #[error("invalid fee: {0}")]
    InvalidFee(&'static str),

    /// A caller supplied amount is zero or otherwise unusable.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(&'static str),

    /// A square-root price lies outside the permitted bounds.
    #[error("sqrt price out of range")]
    PriceOutOfRange,

    /// A token or token pair is malformed.
    #[error("invalid token: {0}")]
    InvalidToken(&'static str),

    /// Vesting parameters are malformed.
    #[error("invalid vesting schedule: {0}")]
    InvalidVestingSchedule(&'static str),

    /// A reward slot operation is not permitted in the current reward state.
    #[error("invalid reward: {0}")]
    InvalidReward(&'static str),

    /// The position does not belong to the pool it was used with.
    #[error("position does not belong to this pool")]
    PositionMismatch,

    /// A caller threshold (minimum out, maximum in) was violated.
    #[error("slippage tolerance exceeded")]
    SlippageExceeded,

    /// The pool cannot provide the requested output.
    #[error("insufficient liquidity")]
    InsufficientLiquidity,

    /// The position does not hold enough unlocked liquidity.
    #[error("insufficient unlocked liquidity")]
    InsufficientUnlockedLiquidity,

    /// Permanent lock requested on a position without unlocked liquidity.
    #[error("nothing to lock")]
    NothingToLock,

    /// A vesting schedule with this index already exists on the position.
    #[error("duplicate vesting index {0}")]
    DuplicateVestingIndex(u64),

    /// No vesting schedule with this index exists on the position.
    #[error("vesting {0} not found")]
    VestingNotFound(u64),

    /// A swap step cannot move the price any further.
    #[error("price limit reached")]
    PriceLimitReached,

    /// The pool has not reached its activation point yet.
    #[error("pool is not active yet")]
    PoolNotActive,

    /// Trading on the pool has been disabled.
    #[error("pool is disabled")]
    PoolDisabled,

    /// The caller is not allowed to perform the operation.
    #[error("unauthorized")]
    Unauthorized,

    /// An intermediate or final value does not fit its representation.
    #[error("arithmetic overflow: {0}")]
    ArithmeticOverflow(&'static str),

    /// A subtraction would produce a negative value.
    #[error("arithmetic underflow: {0}")]
    Underflow(&'static str),

    /// Division by zero.
    #[error("division by zero")]
    DivisionByZero,
}

impl AmmError {
    /// Returns `true` for parameter validation failures, which are raised
    /// before any computation takes place.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidConfiguration(_)
                | Self::InvalidFee(_)
                | Self::InvalidQuantity(_)
                | Self::PriceOutOfRange
                | Self::InvalidToken(_)
                | Self::InvalidVestingSchedule(_)
                | Self::InvalidReward(_)
        )
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = core::result::Result<T, AmmError>;
