//! Convenience re-exports for common types and traits.
//!
//! ```rust
//! use rangepool::prelude::*;
//! ```

pub use crate::domain::{
    ActivationType, Address, Amount, BasisPoints, Clock, Liquidity, Rounding, SwapMode, SwapResult,
    SwapSpec, Token, TokenPair, TokenSide, TradeDirection,
};

pub use crate::traits::{LiquidityPool, SwapPool};

pub use crate::math::CheckedArithmetic;

pub use crate::config::{CollectFeeMode, Config, ConfigParameters};

pub use crate::fee::{FeeBreakdown, FeeModifier, PoolFeeParameters, ReferralFeeSource, TransferFee};

pub use crate::state::{
    InitializePoolParameters, Pool, PoolStatus, Position, TokenAmounts, Vesting, VestingParameters,
};

pub use crate::error::{AmmError, Result};
