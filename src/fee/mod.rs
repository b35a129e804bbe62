//! Fee engine.
//!
//! - Base fee schedules ([`FeeScheduler`]) and the dynamic surcharge
//!   ([`DynamicFeeParameters`], [`DynamicFeeState`]), selected by
//!   [`FeeModifier`].
//! - The split of each fee between liquidity providers, protocol, partner
//!   and referrer ([`split_fee`]).
//! - Per-liquidity fee growth and position settlement ([`FeeGrowth`],
//!   [`settle_position_fees`]).
//! - Token transfer fees ([`TransferFee`]).

mod dynamic;
mod growth;
mod pool_fees;
mod scheduler;
mod split;
mod transfer_fee;

pub use dynamic::{DynamicFeeParameters, DynamicFeeState};
pub use growth::{settle_position_fees, FeeGrowth};
pub use pool_fees::{fee_on_amount, PoolFeeParameters};
pub use scheduler::{current_base_fee_rate, FeeModifier, FeeScheduler, FeeSchedulerMode};
pub use split::{split_fee, validate_split, FeeBreakdown, ReferralFeeSource};
pub use transfer_fee::TransferFee;
