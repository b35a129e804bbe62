//! # rangepool
//!
//! Pricing, fee and position engine for a single-range concentrated
//! liquidity AMM.
//!
//! Each pool trades two tokens along a constant-liquidity curve bounded by
//! a minimum and maximum square-root price. Prices are Q64.64 fixed point
//! and liquidity carries 64 fractional bits. Every operation is checked:
//! overflow surfaces as an [`AmmError`](error::AmmError) and no partial
//! update is ever left behind.
//!
//! On top of the curve the crate provides:
//!
//! - Base fee schedules that decay linearly or exponentially after
//!   activation, plus a volatility-driven dynamic surcharge.
//! - Fee splitting between liquidity providers, protocol, partner and
//!   referrer, with fee collection in both tokens or in token B only.
//! - Positions whose liquidity can be vested on a cliff-plus-periods
//!   schedule or locked forever while still earning fees.
//! - Time-based reward streams in up to two extra tokens.
//! - Token transfer fees applied on the way in and out.
//!
//! # Quick Start
//!
//! ```rust
//! use rangepool::config::{CollectFeeMode, Config, ConfigParameters};
//! use rangepool::domain::{ActivationType, Address, Amount, Clock, Liquidity, Token, TradeDirection};
//! use rangepool::fee::{FeeModifier, PoolFeeParameters, ReferralFeeSource};
//! use rangepool::math::ONE_Q64;
//! use rangepool::state::{InitializePoolParameters, Pool};
//!
//! let config = Config::new(ConfigParameters {
//!     index: 0,
//!     fees: PoolFeeParameters {
//!         cliff_fee_numerator: 2_500_000, // 0.25%
//!         modifier: FeeModifier::None,
//!         protocol_fee_percent: 20,
//!         partner_fee_percent: 0,
//!         referral_fee_percent: 0,
//!         referral_fee_source: ReferralFeeSource::Protocol,
//!     },
//!     sqrt_min_price: ONE_Q64 / 2,
//!     sqrt_max_price: ONE_Q64 * 2,
//!     activation_type: ActivationType::Timestamp,
//!     collect_fee_mode: CollectFeeMode::BothToken,
//! })
//! .expect("valid config");
//!
//! let clock = Clock::new(1, 1_700_000_000);
//! let (mut pool, _creator_position, deposit) = Pool::initialize(
//!     config,
//!     InitializePoolParameters {
//!         address: Address::from_bytes([9u8; 32]),
//!         token_a: Token::new(Address::from_bytes([1u8; 32])),
//!         token_b: Token::new(Address::from_bytes([2u8; 32])),
//!         creator: Address::from_bytes([3u8; 32]),
//!         partner: None,
//!         liquidity: Liquidity::new(1_000_000 << 64),
//!         sqrt_price: ONE_Q64,
//!         activation_point: None,
//!     },
//!     clock,
//! )
//! .expect("pool initialized");
//! assert!(deposit.amount_a.get() > 0 && deposit.amount_b.get() > 0);
//!
//! let result = pool
//!     .swap_exact_in(TradeDirection::AToB, Amount::new(10_000), Amount::ZERO, false, clock)
//!     .expect("swap succeeded");
//! assert!(result.amount_out().get() > 0);
//! assert!(pool.sqrt_price() < ONE_Q64);
//! ```
//!
//! # Module Guide
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`domain`] | Value types: [`Amount`](domain::Amount), [`Liquidity`](domain::Liquidity), [`Token`](domain::Token), [`Clock`](domain::Clock), etc. |
//! | [`math`] | Q64.64 curve math and [`compute_swap_step`](math::compute_swap_step) |
//! | [`fee`] | Fee schedules, dynamic fee, fee split, fee growth, transfer fees |
//! | [`config`] | Validated pool templates: [`Config`](config::Config) |
//! | [`state`] | [`Pool`](state::Pool), [`Position`](state::Position), [`Vesting`](state::Vesting) |
//! | [`traits`] | [`SwapPool`](traits::SwapPool) and [`LiquidityPool`](traits::LiquidityPool) |
//! | [`constants`] | Price bounds, precision and duration limits |
//! | [`error`] | [`AmmError`](error::AmmError) unified error enum |
//! | [`prelude`] | Convenience re-exports |

pub mod config;
pub mod constants;
pub mod domain;
pub mod error;
pub mod fee;
pub mod math;
pub mod prelude;
pub mod state;
pub mod traits;
