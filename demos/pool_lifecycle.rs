//! Pool lifecycle example.
//!
//! Initializes a pool, adds a second provider, trades in both directions,
//! vests part of a position and claims fees.
//!
//! # Run
//!
//! ```bash
//! cargo run --example pool_lifecycle
//! ```

use rangepool::config::{CollectFeeMode, Config, ConfigParameters};
use rangepool::domain::{ActivationType, Address, Amount, Clock, Liquidity, Token, TradeDirection};
use rangepool::fee::{FeeModifier, FeeScheduler, FeeSchedulerMode, PoolFeeParameters, ReferralFeeSource};
use rangepool::math::ONE_Q64;
use rangepool::state::{InitializePoolParameters, Pool, VestingParameters};
use rangepool::traits::{LiquidityPool, SwapPool};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Range pool lifecycle ===\n");

    // ── 1. Config: 1% cliff fee decaying to 0.25% over an hour ─────────
    let config = Config::new(ConfigParameters {
        index: 1,
        fees: PoolFeeParameters {
            cliff_fee_numerator: 10_000_000,
            modifier: FeeModifier::Decay(FeeScheduler {
                number_of_period: 6,
                period_frequency: 600,
                reduction_factor: 1_250_000,
                mode: FeeSchedulerMode::Linear,
            }),
            protocol_fee_percent: 20,
            partner_fee_percent: 10,
            referral_fee_percent: 5,
            referral_fee_source: ReferralFeeSource::Protocol,
        },
        sqrt_min_price: ONE_Q64 / 2,
        sqrt_max_price: ONE_Q64 * 2,
        activation_type: ActivationType::Timestamp,
        collect_fee_mode: CollectFeeMode::BothToken,
    })?;

    // ── 2. Initialize at price 1 ───────────────────────────────────────
    let start = 1_700_000_000;
    let clock = Clock::new(1, start);
    let (mut pool, mut creator, deposit) = Pool::initialize(
        config,
        InitializePoolParameters {
            address: Address::from_bytes([9u8; 32]),
            token_a: Token::new(Address::from_bytes([1u8; 32])),
            token_b: Token::new(Address::from_bytes([2u8; 32])),
            creator: Address::from_bytes([3u8; 32]),
            partner: Some(Address::from_bytes([4u8; 32])),
            liquidity: Liquidity::new(1_000_000_000 << 64),
            sqrt_price: ONE_Q64,
            activation_point: None,
        },
        clock,
    )?;
    println!(
        "Creator deposited {} A and {} B",
        deposit.amount_a, deposit.amount_b
    );

    // ── 3. A second provider joins ─────────────────────────────────────
    let mut joiner = pool.create_position(Address::from_bytes([7u8; 32]))?;
    let added = pool.add_liquidity(
        &mut joiner,
        Liquidity::new(500_000_000 << 64),
        Amount::MAX,
        Amount::MAX,
        clock,
    )?;
    println!("Joiner deposited {} A and {} B", added.amount_a, added.amount_b);

    // ── 4. Trade ───────────────────────────────────────────────────────
    println!("Fee at launch: {}", pool.current_fee_numerator(clock)?);
    let sell = pool.swap_exact_in(TradeDirection::AToB, Amount::new(5_000_000), Amount::ZERO, true, clock)?;
    println!(
        "Sold {} A for {} B, fee {}",
        sell.amount_in(),
        sell.amount_out(),
        sell.fee()
    );

    let later = Clock::new(2, start + 3_600);
    println!("Fee after an hour: {}", pool.current_fee_numerator(later)?);
    let buy = pool.swap_exact_out(TradeDirection::BToA, Amount::new(2_000_000), Amount::MAX, false, later)?;
    println!(
        "Bought {} A for {} B, fee {}",
        buy.amount_out(),
        buy.amount_in(),
        buy.fee()
    );

    // ── 5. Vest half of the creator's liquidity ────────────────────────
    let half = creator.unlocked_liquidity().get() / 2;
    pool.lock_position(
        &mut creator,
        0,
        &VestingParameters {
            cliff_point: Some(start + 7_200),
            period_frequency: 3_600,
            cliff_unlock_liquidity: half / 2,
            liquidity_per_period: half / 8,
            number_of_period: 4,
        },
        later,
    )?;
    let released = pool.refresh_vestings(&mut creator, &[0], Clock::new(3, start + 7_200))?;
    println!(
        "Cliff released {} liquidity; {} still vesting",
        released,
        creator.vested_liquidity()
    );

    // ── 6. Claim ───────────────────────────────────────────────────────
    let creator_fees = pool.claim_position_fee(&mut creator)?;
    let joiner_fees = pool.claim_position_fee(&mut joiner)?;
    let protocol = pool.claim_protocol_fee()?;
    println!(
        "Creator fees: {} A / {} B",
        creator_fees.amount_a, creator_fees.amount_b
    );
    println!("Joiner fees:  {} A / {} B", joiner_fees.amount_a, joiner_fees.amount_b);
    println!("Protocol:     {} A / {} B", protocol.amount_a, protocol.amount_b);

    Ok(())
}
