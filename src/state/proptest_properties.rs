//! Property-based tests for pool and position invariants.
//!
//! 1. **Deposit round trip**: adding then removing the same liquidity at
//!    the same price never returns more than was deposited.
//! 2. **Settlement idempotence**: settling a position twice with nothing in
//!    between credits nothing the second time.
//! 3. **Vesting cap**: released liquidity never exceeds the schedule total,
//!    and an exhausted schedule no longer exists.
//! 4. **Permanent lock**: permanently locked liquidity never comes back.
//! 5. **Price direction**: across any sequence of exact-in and exact-out
//!    trades, selling A never raises the price, selling B never lowers it,
//!    and the price stays inside the range. Only running out of range is
//!    an acceptable failure.

use proptest::prelude::*;

use super::{Pool, Position, VestingParameters};
use crate::config::{CollectFeeMode, Config, ConfigParameters};
use crate::constants::{MAX_SQRT_PRICE, MIN_LP_AMOUNT, MIN_SQRT_PRICE};
use crate::domain::{ActivationType, Address, Amount, Clock, Liquidity, Token, TradeDirection};
use crate::error::AmmError;
use crate::fee::{settle_position_fees, FeeModifier, PoolFeeParameters, ReferralFeeSource};
use crate::math::ONE_Q64;
use crate::state::InitializePoolParameters;
use crate::traits::LiquidityPool;

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

const START: u64 = 1_000;

fn clock(at: u64) -> Clock {
    Clock::new(at, at)
}

fn config(collect_fee_mode: CollectFeeMode, sqrt_min_price: u128, sqrt_max_price: u128) -> Config {
    let Ok(config) = Config::new(ConfigParameters {
        index: 0,
        fees: PoolFeeParameters {
            cliff_fee_numerator: 2_500_000,
            modifier: FeeModifier::None,
            protocol_fee_percent: 20,
            partner_fee_percent: 0,
            referral_fee_percent: 0,
            referral_fee_source: ReferralFeeSource::Protocol,
        },
        sqrt_min_price,
        sqrt_max_price,
        activation_type: ActivationType::Timestamp,
        collect_fee_mode,
    }) else {
        panic!("valid config");
    };
    config
}

/// Full-range pool at price 1 whose creator holds `liquidity`.
fn make_pool(liquidity: u128, collect_fee_mode: CollectFeeMode) -> (Pool, Position) {
    make_pool_in(liquidity, collect_fee_mode, MIN_SQRT_PRICE, MAX_SQRT_PRICE)
}

/// Pool at price 1 over `[sqrt_min_price, sqrt_max_price]`.
fn make_pool_in(
    liquidity: u128,
    collect_fee_mode: CollectFeeMode,
    sqrt_min_price: u128,
    sqrt_max_price: u128,
) -> (Pool, Position) {
    let Ok((pool, position, _)) = Pool::initialize(
        config(collect_fee_mode, sqrt_min_price, sqrt_max_price),
        InitializePoolParameters {
            address: Address::from_bytes([9u8; 32]),
            token_a: Token::new(Address::from_bytes([1u8; 32])),
            token_b: Token::new(Address::from_bytes([2u8; 32])),
            creator: Address::from_bytes([3u8; 32]),
            partner: None,
            liquidity: Liquidity::new(liquidity),
            sqrt_price: ONE_Q64,
            activation_point: None,
        },
        clock(START),
    ) else {
        panic!("valid pool");
    };
    (pool, position)
}

// ---------------------------------------------------------------------------
// Custom strategies
// ---------------------------------------------------------------------------

/// Liquidity deltas from dust up to ~10¹² tokens per side.
fn delta_strategy() -> impl Strategy<Value = u128> {
    1u128..=(1_000_000_000_000u128 << 64)
}

/// Swap inputs that stay well inside the pool's depth.
fn swap_amount_strategy() -> impl Strategy<Value = u64> {
    1u64..=1_000_000_000u64
}

fn collect_fee_mode_strategy() -> impl Strategy<Value = CollectFeeMode> {
    prop_oneof![Just(CollectFeeMode::BothToken), Just(CollectFeeMode::OnlyB)]
}

// ---------------------------------------------------------------------------
// Property 1: Deposit round trip
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_add_then_remove_never_profits(delta in delta_strategy()) {
        let (mut pool, mut position) = make_pool(MIN_LP_AMOUNT * 1_000, CollectFeeMode::BothToken);
        let delta = Liquidity::new(delta);
        let Ok(deposited) = pool.add_liquidity(&mut position, delta, Amount::MAX, Amount::MAX, clock(START)) else {
            return Ok(());
        };
        let Ok(returned) = pool.remove_liquidity(&mut position, delta, Amount::ZERO, Amount::ZERO, clock(START)) else {
            prop_assert!(false, "removing freshly added liquidity failed");
            return Ok(());
        };
        prop_assert!(returned.amount_a <= deposited.amount_a);
        prop_assert!(returned.amount_b <= deposited.amount_b);
    }
}

// ---------------------------------------------------------------------------
// Property 2: Settlement idempotence
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_second_settlement_credits_nothing(
        amount in swap_amount_strategy(),
        mode in collect_fee_mode_strategy(),
    ) {
        let (mut pool, mut position) = make_pool(MIN_LP_AMOUNT * 1_000_000, mode);
        let Ok(_) = pool.swap_exact_in(TradeDirection::BToA, Amount::new(amount), Amount::ZERO, false, clock(START)) else {
            return Ok(());
        };
        prop_assert_eq!(settle_position_fees(&mut position, pool.fee_growth()), Ok(()));
        let owed = (position.fee_a_owed(), position.fee_b_owed());
        prop_assert_eq!(settle_position_fees(&mut position, pool.fee_growth()), Ok(()));
        prop_assert_eq!((position.fee_a_owed(), position.fee_b_owed()), owed);
    }
}

// ---------------------------------------------------------------------------
// Property 3: Vesting cap
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_vesting_never_over_releases(
        cliff in 0u128..=1_000_000,
        per_period in 1u128..=1_000_000,
        periods in 0u16..=20,
        frequency in 1u64..=50,
        steps in proptest::collection::vec(0u64..=200, 1..12),
    ) {
        let (mut pool, mut position) = make_pool(MIN_LP_AMOUNT, CollectFeeMode::BothToken);
        let params = VestingParameters {
            cliff_point: Some(START + 10),
            period_frequency: frequency,
            cliff_unlock_liquidity: cliff,
            liquidity_per_period: per_period,
            number_of_period: periods,
        };
        let Ok(total) = params.total_lock_amount() else {
            return Ok(());
        };
        if pool.lock_position(&mut position, 0, &params, clock(START)).is_err() {
            return Ok(());
        }

        let mut now = START;
        for step in steps {
            now += step;
            match pool.refresh_vestings(&mut position, &[0], clock(now)) {
                Ok(_) => {}
                Err(AmmError::VestingNotFound(0)) => break,
                Err(err) => {
                    prop_assert!(false, "unexpected refresh error: {err}");
                }
            }
            match position.vesting(0) {
                Some(vesting) => {
                    prop_assert!(vesting.total_released_liquidity() < total);
                }
                None => {
                    prop_assert_eq!(position.vested_liquidity(), Liquidity::ZERO);
                }
            }
        }
        let released = total - position.vested_liquidity().get();
        prop_assert!(released <= total);
        prop_assert_eq!(position.total_liquidity(), Ok(Liquidity::new(MIN_LP_AMOUNT)));
    }
}

// ---------------------------------------------------------------------------
// Property 4: Permanent lock
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_permanent_lock_is_irreversible(
        delta in delta_strategy(),
        amount in swap_amount_strategy(),
    ) {
        let (mut pool, mut position) = make_pool(MIN_LP_AMOUNT * 1_000_000, CollectFeeMode::BothToken);
        let Ok(locked) = pool.permanent_lock_position(&mut position) else {
            panic!("creator position has unlocked liquidity");
        };

        let swapped = pool.swap_exact_in(TradeDirection::AToB, Amount::new(amount), Amount::ZERO, false, clock(START));
        prop_assert!(swapped.is_ok(), "swap against locked liquidity failed: {swapped:?}");
        let claimed = pool.claim_position_fee(&mut position);
        prop_assert!(claimed.is_ok(), "claim on a locked position failed: {claimed:?}");
        prop_assert_eq!(pool.refresh_vestings(&mut position, &[], clock(START + 1)), Ok(Liquidity::ZERO));

        prop_assert_eq!(
            pool.remove_liquidity(&mut position, Liquidity::new(delta), Amount::ZERO, Amount::ZERO, clock(START + 1)),
            Err(AmmError::InsufficientUnlockedLiquidity)
        );
        let vesting = VestingParameters {
            cliff_point: Some(START + 100),
            period_frequency: 10,
            cliff_unlock_liquidity: 1,
            liquidity_per_period: 1,
            number_of_period: 1,
        };
        prop_assert_eq!(
            pool.lock_position(&mut position, 0, &vesting, clock(START + 1)),
            Err(AmmError::InsufficientUnlockedLiquidity)
        );
        prop_assert_eq!(pool.permanent_lock_position(&mut position), Err(AmmError::NothingToLock));

        prop_assert_eq!(position.unlocked_liquidity(), Liquidity::ZERO);
        prop_assert_eq!(position.vested_liquidity(), Liquidity::ZERO);
        prop_assert_eq!(position.permanent_locked_liquidity(), locked);
        prop_assert_eq!(pool.permanent_lock_liquidity(), locked);
    }
}

// ---------------------------------------------------------------------------
// Property 5: Price direction
// ---------------------------------------------------------------------------

/// One trade of a random sequence: direction, exact-out flag, amount.
fn trade_strategy() -> impl Strategy<Value = (TradeDirection, bool, u64)> {
    (
        prop_oneof![Just(TradeDirection::AToB), Just(TradeDirection::BToA)],
        any::<bool>(),
        swap_amount_strategy(),
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn prop_trades_move_price_with_direction(
        trades in proptest::collection::vec(trade_strategy(), 1..16),
        mode in collect_fee_mode_strategy(),
    ) {
        // Liquidity of 10⁹ over [½, 2]: a few trades reach either bound.
        let (mut pool, _) = make_pool_in(1_000_000_000 << 64, mode, ONE_Q64 / 2, ONE_Q64 * 2);
        let (sqrt_min, sqrt_max) = (pool.config().sqrt_min_price(), pool.config().sqrt_max_price());

        let mut now = START;
        for (step, (direction, exact_out, amount)) in trades.into_iter().enumerate() {
            now += 1;
            let before = pool.sqrt_price();
            let outcome = if exact_out {
                pool.swap_exact_out(direction, Amount::new(amount), Amount::MAX, false, clock(now))
            } else {
                pool.swap_exact_in(direction, Amount::new(amount), Amount::ZERO, false, clock(now))
            };
            match outcome {
                Ok(result) => {
                    prop_assert_eq!(result.next_sqrt_price(), pool.sqrt_price());
                }
                Err(AmmError::PriceLimitReached) if !exact_out => {
                    prop_assert_eq!(pool.sqrt_price(), before);
                }
                Err(AmmError::InsufficientLiquidity) if exact_out => {
                    prop_assert_eq!(pool.sqrt_price(), before);
                }
                Err(err) => {
                    prop_assert!(false, "unexpected swap error at trade {step}: {err}");
                }
            }
            let after = pool.sqrt_price();
            match direction {
                TradeDirection::AToB => {
                    prop_assert!(after <= before, "selling A raised the price at trade {step}");
                }
                TradeDirection::BToA => {
                    prop_assert!(after >= before, "selling B lowered the price at trade {step}");
                }
            }
            prop_assert!(sqrt_min <= after && after <= sqrt_max);
        }
    }
}
