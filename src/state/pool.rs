//! The pool: price, liquidity, vault balances and fee state of one pair.
//!
//! Every mutating method stages its work on copies of the pool and the
//! position and commits only when the whole operation succeeded, so a
//! failed call leaves both untouched.

use std::collections::BTreeSet;

use tracing::debug;

use super::metrics::PoolMetrics;
use super::position::Position;
use super::reward::RewardInfo;
use super::vesting::{Vesting, VestingParameters};
use crate::config::Config;
use crate::constants::{MAX_REWARD_DURATION, MIN_LP_AMOUNT, MIN_REWARD_DURATION, NUM_REWARDS};
use crate::domain::{
    Address, Amount, Clock, Liquidity, Rounding, SwapMode, SwapResult, SwapSpec, Token, TokenPair,
    TokenSide, TradeDirection,
};
use crate::error::{AmmError, Result};
use crate::fee::{settle_position_fees, DynamicFeeState, FeeBreakdown, FeeGrowth, FeeModifier};
use crate::math::{
    amounts_from_liquidity, compute_swap_step, get_delta_amount_a, get_delta_amount_b,
    get_initialize_amounts, CheckedArithmetic, FeeSide, SwapStep,
};
use crate::traits::{LiquidityPool, SwapPool};

/// Whether a pool accepts trades and deposits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PoolStatus {
    /// Fully operational.
    #[default]
    Enabled,
    /// Swaps and deposits are rejected; withdrawals and claims still work.
    Disabled,
}

/// Token amounts as seen by the user: what they must send for a deposit,
/// or what arrives for a withdrawal or claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TokenAmounts {
    /// Token A.
    pub amount_a: Amount,
    /// Token B.
    pub amount_b: Amount,
}

impl TokenAmounts {
    const fn new(amount_a: u64, amount_b: u64) -> Self {
        Self {
            amount_a: Amount::new(amount_a),
            amount_b: Amount::new(amount_b),
        }
    }
}

/// Arguments of [`Pool::initialize`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitializePoolParameters {
    /// Identity of the new pool.
    pub address: Address,
    /// Token A.
    pub token_a: Token,
    /// Token B.
    pub token_b: Token,
    /// Owner of the initial position.
    pub creator: Address,
    /// Account entitled to the partner fee share, if any.
    pub partner: Option<Address>,
    /// Liquidity of the initial position.
    pub liquidity: Liquidity,
    /// Starting square-root price, Q64.64.
    pub sqrt_price: u128,
    /// First point at which swaps are accepted; `None` means immediately.
    pub activation_point: Option<u64>,
}

/// A single-range concentrated liquidity pool.
///
/// Liquidity is active over the config's whole `[sqrt_min_price,
/// sqrt_max_price]` range. The vault balances hold the reserves backing
/// that liquidity plus every fee not yet claimed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pool {
    address: Address,
    config: Config,
    tokens: TokenPair,
    creator: Address,
    partner: Option<Address>,
    status: PoolStatus,
    activation_point: u64,
    sqrt_price: u128,
    liquidity: Liquidity,
    permanent_lock_liquidity: Liquidity,
    token_a_amount: u64,
    token_b_amount: u64,
    fee_growth: FeeGrowth,
    protocol_a_fee: u64,
    protocol_b_fee: u64,
    partner_a_fee: u64,
    partner_b_fee: u64,
    dynamic_fee: Option<DynamicFeeState>,
    reward_infos: [RewardInfo; NUM_REWARDS],
    metrics: PoolMetrics,
}

impl Pool {
    /// Creates a pool from `config` together with the creator's position,
    /// which holds the initial liquidity.
    ///
    /// Returns the pool, the position and the amounts the creator must
    /// send, transfer fees included.
    ///
    /// # Errors
    ///
    /// - Any [`Config::validate`] error.
    /// - [`AmmError::InvalidToken`] if both tokens share a mint.
    /// - [`AmmError::InvalidQuantity`] if the liquidity is below
    ///   [`MIN_LP_AMOUNT`] or backs no tokens at all.
    /// - [`AmmError::PriceOutOfRange`] if `sqrt_price` is outside the
    ///   config's range.
    pub fn initialize(
        config: Config,
        params: InitializePoolParameters,
        clock: Clock,
    ) -> Result<(Self, Position, TokenAmounts)> {
        config.validate()?;
        let tokens = TokenPair::new(params.token_a, params.token_b)?;
        if params.liquidity.get() < MIN_LP_AMOUNT {
            return Err(AmmError::InvalidQuantity("initial liquidity below minimum"));
        }
        if params.sqrt_price < config.sqrt_min_price() || params.sqrt_price > config.sqrt_max_price() {
            return Err(AmmError::PriceOutOfRange);
        }
        let (amount_a, amount_b) = get_initialize_amounts(
            config.sqrt_min_price(),
            config.sqrt_max_price(),
            params.sqrt_price,
            params.liquidity.get(),
        )?;
        if amount_a == 0 && amount_b == 0 {
            return Err(AmmError::InvalidQuantity("initial liquidity backs no tokens"));
        }
        let deposit = TokenAmounts {
            amount_a: tokens.token_a().amount_to_send(Amount::new(amount_a))?,
            amount_b: tokens.token_b().amount_to_send(Amount::new(amount_b))?,
        };

        let current_point = clock.current_point(config.activation_type());
        let dynamic_fee = match config.fees().modifier {
            FeeModifier::Dynamic(_) => Some(DynamicFeeState::new(params.sqrt_price, clock.unix_timestamp)),
            FeeModifier::None | FeeModifier::Decay(_) => None,
        };
        let mut pool = Self {
            address: params.address,
            config,
            tokens,
            creator: params.creator,
            partner: params.partner,
            status: PoolStatus::Enabled,
            activation_point: params.activation_point.unwrap_or(current_point),
            sqrt_price: params.sqrt_price,
            liquidity: params.liquidity,
            permanent_lock_liquidity: Liquidity::ZERO,
            token_a_amount: amount_a,
            token_b_amount: amount_b,
            fee_growth: FeeGrowth::default(),
            protocol_a_fee: 0,
            protocol_b_fee: 0,
            partner_a_fee: 0,
            partner_b_fee: 0,
            dynamic_fee,
            reward_infos: [RewardInfo::default(); NUM_REWARDS],
            metrics: PoolMetrics::default(),
        };
        let mut position = pool.create_position(params.creator)?;
        position.add_unlocked(params.liquidity)?;

        debug!(
            pool = %pool.address,
            liquidity = params.liquidity.get(),
            sqrt_price = params.sqrt_price,
            amount_a,
            amount_b,
            activation_point = pool.activation_point,
            "pool initialized"
        );
        Ok((pool, position, deposit))
    }

    /// Opens an empty position for `owner`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the position counter
    /// overflows.
    pub fn create_position(&mut self, owner: Address) -> Result<Position> {
        self.metrics.record_position()?;
        Ok(Position::new(self.address, owner, self.fee_growth, &self.reward_infos))
    }

    /// Identity of the pool.
    #[must_use]
    pub const fn address(&self) -> Address {
        self.address
    }

    /// Config the pool was created from.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Creator of the pool.
    #[must_use]
    pub const fn creator(&self) -> Address {
        self.creator
    }

    /// Partner entitled to the partner fee share, if any.
    #[must_use]
    pub const fn partner(&self) -> Option<Address> {
        self.partner
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> PoolStatus {
        self.status
    }

    /// First point at which swaps are accepted.
    #[must_use]
    pub const fn activation_point(&self) -> u64 {
        self.activation_point
    }

    /// Current square-root price, Q64.64.
    #[must_use]
    pub const fn sqrt_price(&self) -> u128 {
        self.sqrt_price
    }

    /// Active liquidity, permanently locked liquidity included.
    #[must_use]
    pub const fn liquidity(&self) -> Liquidity {
        self.liquidity
    }

    /// Liquidity that can never be withdrawn.
    #[must_use]
    pub const fn permanent_lock_liquidity(&self) -> Liquidity {
        self.permanent_lock_liquidity
    }

    /// Vault balance of `side`: reserves plus unclaimed fees.
    #[must_use]
    pub const fn vault_amount(&self, side: TokenSide) -> u64 {
        match side {
            TokenSide::A => self.token_a_amount,
            TokenSide::B => self.token_b_amount,
        }
    }

    /// Global fee growth per unit of liquidity.
    #[must_use]
    pub const fn fee_growth(&self) -> &FeeGrowth {
        &self.fee_growth
    }

    /// Unclaimed protocol fees.
    #[must_use]
    pub const fn protocol_fee(&self) -> TokenAmounts {
        TokenAmounts::new(self.protocol_a_fee, self.protocol_b_fee)
    }

    /// Unclaimed partner fees.
    #[must_use]
    pub const fn partner_fee(&self) -> TokenAmounts {
        TokenAmounts::new(self.partner_a_fee, self.partner_b_fee)
    }

    /// Volatility state of a dynamic fee pool.
    #[must_use]
    pub const fn dynamic_fee(&self) -> Option<&DynamicFeeState> {
        self.dynamic_fee.as_ref()
    }

    /// Reward slot `index`.
    #[must_use]
    pub fn reward_info(&self, index: usize) -> Option<&RewardInfo> {
        self.reward_infos.get(index)
    }

    /// Lifetime counters.
    #[must_use]
    pub const fn metrics(&self) -> &PoolMetrics {
        &self.metrics
    }

    /// Enables or disables the pool.
    pub fn set_status(&mut self, status: PoolStatus) {
        if self.status != status {
            debug!(pool = %self.address, ?status, "pool status changed");
        }
        self.status = status;
    }

    fn vault_mut(&mut self, side: TokenSide) -> &mut u64 {
        match side {
            TokenSide::A => &mut self.token_a_amount,
            TokenSide::B => &mut self.token_b_amount,
        }
    }

    fn deposit_to_vault(&mut self, side: TokenSide, amount: u64) -> Result<()> {
        let vault = self.vault_mut(side);
        *vault = vault.safe_add(&amount)?;
        Ok(())
    }

    fn withdraw_from_vault(&mut self, side: TokenSide, amount: u64) -> Result<()> {
        let vault = self.vault_mut(side);
        *vault = vault.safe_sub(&amount)?;
        Ok(())
    }

    /// Amount arriving at the user when the vault sends `amount` of `side`.
    fn amount_received(&self, side: TokenSide, amount: u64) -> Amount {
        self.tokens.token(side).amount_received(Amount::new(amount))
    }

    /// Runs `op` on staged copies of the pool and `position`, committing
    /// both only if it succeeds.
    fn transact<T>(
        &mut self,
        position: &mut Position,
        op: impl FnOnce(&mut Self, &mut Position) -> Result<T>,
    ) -> Result<T> {
        if position.pool() != self.address {
            return Err(AmmError::PositionMismatch);
        }
        let mut pool = self.clone();
        let mut staged = position.clone();
        let out = op(&mut pool, &mut staged)?;
        *self = pool;
        *position = staged;
        Ok(out)
    }

    /// Runs `op` on a staged copy of the pool, committing only on success.
    fn transact_pool<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mut pool = self.clone();
        let out = op(&mut pool)?;
        *self = pool;
        Ok(out)
    }

    /// Brings pool rewards to `clock`, then settles the position's fees and
    /// rewards against the liquidity it held so far.
    fn settle_position(&mut self, position: &mut Position, clock: Clock) -> Result<()> {
        self.update_rewards(clock)?;
        settle_position_fees(position, &self.fee_growth)?;
        position.update_rewards(&self.reward_infos)
    }

    fn ensure_enabled(&self) -> Result<()> {
        match self.status {
            PoolStatus::Enabled => Ok(()),
            PoolStatus::Disabled => Err(AmmError::PoolDisabled),
        }
    }

    /// Withdraws all of the position's unlocked liquidity.
    ///
    /// # Errors
    ///
    /// Same as [`LiquidityPool::remove_liquidity`]; an empty unlocked
    /// bucket is [`AmmError::InvalidQuantity`].
    pub fn remove_all_liquidity(
        &mut self,
        position: &mut Position,
        min_a: Amount,
        min_b: Amount,
        clock: Clock,
    ) -> Result<TokenAmounts> {
        let delta = position.unlocked_liquidity();
        self.remove_liquidity(position, delta, min_a, min_b, clock)
    }

    /// Exact-in swap.
    ///
    /// # Errors
    ///
    /// See [`SwapPool::swap`].
    pub fn swap_exact_in(
        &mut self,
        direction: TradeDirection,
        amount_in: Amount,
        minimum_amount_out: Amount,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        let spec = SwapSpec::exact_in(amount_in, minimum_amount_out)?;
        self.swap(direction, spec, has_referral, clock)
    }

    /// Exact-out swap.
    ///
    /// # Errors
    ///
    /// See [`SwapPool::swap`].
    pub fn swap_exact_out(
        &mut self,
        direction: TradeDirection,
        amount_out: Amount,
        maximum_amount_in: Amount,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        let spec = SwapSpec::exact_out(amount_out, maximum_amount_in)?;
        self.swap(direction, spec, has_referral, clock)
    }

    /// What an exact-in swap of `amount_in` would return, without
    /// mutating the pool or checking slippage.
    ///
    /// # Errors
    ///
    /// See [`SwapPool::swap`].
    pub fn quote_exact_in(
        &self,
        direction: TradeDirection,
        amount_in: Amount,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        let spec = SwapSpec::exact_in(amount_in, Amount::ZERO)?;
        self.quote(direction, spec, has_referral, clock)
    }

    /// What an exact-out swap of `amount_out` would cost, without
    /// mutating the pool or checking slippage.
    ///
    /// # Errors
    ///
    /// See [`SwapPool::swap`].
    pub fn quote_exact_out(
        &self,
        direction: TradeDirection,
        amount_out: Amount,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        let spec = SwapSpec::exact_out(amount_out, Amount::MAX)?;
        self.quote(direction, spec, has_referral, clock)
    }

    /// Largest curve input a swap in `direction` can absorb before the
    /// price reaches the edge of the range, fee excluded.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the amount exceeds `u64`.
    pub fn max_amount_in(&self, direction: TradeDirection) -> Result<Amount> {
        let liquidity = self.liquidity.get();
        let amount = match direction {
            TradeDirection::AToB => {
                get_delta_amount_a(self.config.sqrt_min_price(), self.sqrt_price, liquidity, Rounding::Up)?
            }
            TradeDirection::BToA => {
                get_delta_amount_b(self.sqrt_price, self.config.sqrt_max_price(), liquidity, Rounding::Up)?
            }
        };
        Ok(Amount::new(amount))
    }

    fn execute_swap(
        &mut self,
        direction: TradeDirection,
        spec: SwapSpec,
        has_referral: bool,
        clock: Clock,
        check_slippage: bool,
    ) -> Result<SwapResult> {
        self.ensure_enabled()?;
        let current_point = clock.current_point(self.config.activation_type());
        if current_point < self.activation_point {
            return Err(AmmError::PoolNotActive);
        }

        let dynamic_params = match self.config.fees().modifier {
            FeeModifier::Dynamic(params) => Some(params),
            FeeModifier::None | FeeModifier::Decay(_) => None,
        };
        if let (Some(params), Some(state)) = (dynamic_params.as_ref(), self.dynamic_fee.as_mut()) {
            state.update_references(params, self.sqrt_price, clock.unix_timestamp)?;
        }
        let fee_numerator = self.config.fees().current_fee_numerator(
            current_point,
            self.activation_point,
            self.dynamic_fee.as_ref(),
        )?;

        let (fee_side, fee_token) = self.config.collect_fee_mode().fee_side(direction);
        let input_token = self.tokens.token(direction.input_side());
        let output_token = self.tokens.token(direction.output_side());
        let mode = spec.mode();
        // Input the vault receives (exact in) or output it must send (exact out).
        let requested = match spec {
            SwapSpec::ExactIn { amount_in, .. } => input_token.amount_received(amount_in),
            SwapSpec::ExactOut { amount_out, .. } => output_token.amount_to_send(amount_out)?,
        };
        if requested.is_zero() {
            return Err(AmmError::InvalidQuantity("swap amount consumed by transfer fee"));
        }

        let total = self.run_swap_steps(direction, requested.get(), fee_numerator, mode, fee_side)?;

        let (user_in, user_out) = match spec {
            SwapSpec::ExactIn {
                amount_in,
                minimum_amount_out,
            } => {
                let received = output_token.amount_received(Amount::new(total.amount_out));
                if check_slippage && received < minimum_amount_out {
                    return Err(AmmError::SlippageExceeded);
                }
                (amount_in, received)
            }
            SwapSpec::ExactOut {
                amount_out,
                maximum_amount_in,
            } => {
                let to_send = input_token.amount_to_send(Amount::new(total.amount_in))?;
                if check_slippage && to_send > maximum_amount_in {
                    return Err(AmmError::SlippageExceeded);
                }
                (to_send, amount_out)
            }
        };

        let fee = self.split_trading_fee(total.fee_amount, has_referral)?;
        self.fee_growth.accrue(fee_token, fee.lp, self.liquidity.get())?;
        match fee_token {
            TokenSide::A => {
                self.protocol_a_fee = self.protocol_a_fee.safe_add(&fee.protocol)?;
                self.partner_a_fee = self.partner_a_fee.safe_add(&fee.partner)?;
            }
            TokenSide::B => {
                self.protocol_b_fee = self.protocol_b_fee.safe_add(&fee.protocol)?;
                self.partner_b_fee = self.partner_b_fee.safe_add(&fee.partner)?;
            }
        }
        self.metrics.accumulate_fee(fee_token, &fee)?;

        self.deposit_to_vault(direction.input_side(), total.amount_in)?;
        self.withdraw_from_vault(direction.output_side(), total.amount_out)?;
        self.withdraw_from_vault(fee_token, fee.referral)?;

        let old_sqrt_price = self.sqrt_price;
        self.sqrt_price = total.next_sqrt_price;
        if let (Some(params), Some(state)) = (dynamic_params.as_ref(), self.dynamic_fee.as_mut()) {
            state.update_volatility_accumulator(params, self.sqrt_price, clock.unix_timestamp)?;
        }

        debug!(
            pool = %self.address,
            ?direction,
            ?mode,
            amount_in = user_in.get(),
            amount_out = user_out.get(),
            fee_numerator,
            %fee,
            old_sqrt_price,
            sqrt_price = self.sqrt_price,
            "swap"
        );
        Ok(SwapResult::new(direction, user_in, user_out, self.sqrt_price, fee, fee_token))
    }

    /// Steps toward the edge of the range until `amount` is filled.
    ///
    /// Returns the summed step; `next_sqrt_price` is where the swap ends.
    fn run_swap_steps(
        &self,
        direction: TradeDirection,
        amount: u64,
        fee_numerator: u64,
        mode: SwapMode,
        fee_side: FeeSide,
    ) -> Result<SwapStep> {
        let target = match direction {
            TradeDirection::AToB => self.config.sqrt_min_price(),
            TradeDirection::BToA => self.config.sqrt_max_price(),
        };
        let mut total = SwapStep {
            next_sqrt_price: self.sqrt_price,
            ..SwapStep::default()
        };
        let mut remaining = amount;
        while remaining > 0 {
            let step = compute_swap_step(
                total.next_sqrt_price,
                target,
                self.liquidity.get(),
                remaining,
                fee_numerator,
                mode,
                fee_side,
            )
            .map_err(|err| match (mode, err) {
                (SwapMode::ExactOut, AmmError::PriceLimitReached) => AmmError::InsufficientLiquidity,
                (_, err) => err,
            })?;
            let filled = match mode {
                SwapMode::ExactIn => step.amount_in,
                SwapMode::ExactOut => step.amount_out,
            };
            remaining = remaining.safe_sub(&filled)?;
            total.next_sqrt_price = step.next_sqrt_price;
            total.amount_in = total.amount_in.safe_add(&step.amount_in)?;
            total.amount_out = total.amount_out.safe_add(&step.amount_out)?;
            total.fee_amount = total.fee_amount.safe_add(&step.fee_amount)?;
        }
        Ok(total)
    }

    /// Splits a trading fee; without a partner the partner share stays
    /// with liquidity providers.
    fn split_trading_fee(&self, total: u64, has_referral: bool) -> Result<FeeBreakdown> {
        let mut fees = *self.config.fees();
        if self.partner.is_none() {
            fees.partner_fee_percent = 0;
        }
        fees.split_fee(total, has_referral)
    }

    /// Drains the protocol fee balances.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Underflow`] if the vault cannot cover the
    /// balances, which indicates corrupted accounting.
    pub fn claim_protocol_fee(&mut self) -> Result<TokenAmounts> {
        self.transact_pool(|pool| {
            let (fee_a, fee_b) = (pool.protocol_a_fee, pool.protocol_b_fee);
            pool.withdraw_from_vault(TokenSide::A, fee_a)?;
            pool.withdraw_from_vault(TokenSide::B, fee_b)?;
            pool.protocol_a_fee = 0;
            pool.protocol_b_fee = 0;
            debug!(pool = %pool.address, fee_a, fee_b, "protocol fee claimed");
            Ok(TokenAmounts {
                amount_a: pool.amount_received(TokenSide::A, fee_a),
                amount_b: pool.amount_received(TokenSide::B, fee_b),
            })
        })
    }

    /// Claims up to `max_a` and `max_b` of the partner fee balances.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::Unauthorized`] unless `partner` is the pool's
    /// partner.
    pub fn claim_partner_fee(
        &mut self,
        partner: &Address,
        max_a: Amount,
        max_b: Amount,
    ) -> Result<TokenAmounts> {
        if self.partner != Some(*partner) {
            return Err(AmmError::Unauthorized);
        }
        self.transact_pool(|pool| {
            let fee_a = pool.partner_a_fee.min(max_a.get());
            let fee_b = pool.partner_b_fee.min(max_b.get());
            pool.partner_a_fee = pool.partner_a_fee.safe_sub(&fee_a)?;
            pool.partner_b_fee = pool.partner_b_fee.safe_sub(&fee_b)?;
            pool.withdraw_from_vault(TokenSide::A, fee_a)?;
            pool.withdraw_from_vault(TokenSide::B, fee_b)?;
            debug!(pool = %pool.address, fee_a, fee_b, "partner fee claimed");
            Ok(TokenAmounts {
                amount_a: pool.amount_received(TokenSide::A, fee_a),
                amount_b: pool.amount_received(TokenSide::B, fee_b),
            })
        })
    }

    /// Moves liquidity from the position's unlocked bucket into a new
    /// vesting schedule keyed by `index`.
    ///
    /// The position keeps earning fees on the locked liquidity.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidVestingSchedule`] for a malformed schedule.
    /// - [`AmmError::DuplicateVestingIndex`] if `index` is taken.
    /// - [`AmmError::InsufficientUnlockedLiquidity`] if the schedule locks
    ///   more than is unlocked.
    pub fn lock_position(
        &mut self,
        position: &mut Position,
        index: u64,
        params: &VestingParameters,
        clock: Clock,
    ) -> Result<()> {
        let current_point = clock.current_point(self.config.activation_type());
        params.validate(current_point)?;
        let vesting = Vesting::new(index, params, current_point);
        self.transact(position, |pool, position| {
            position.insert_vesting(vesting)?;
            debug!(
                pool = %pool.address,
                owner = %position.owner(),
                index,
                cliff_point = vesting.cliff_point(),
                locked = vesting.total_lock_amount()?,
                "position locked"
            );
            Ok(())
        })
    }

    /// Releases whatever the listed schedules have unlocked by `clock`,
    /// in the given order. Exhausted schedules are removed.
    ///
    /// Returns the total liquidity moved back to the unlocked bucket.
    ///
    /// # Errors
    ///
    /// - [`AmmError::DuplicateVestingIndex`] if an index is listed twice.
    /// - [`AmmError::VestingNotFound`] if an index has no live schedule.
    pub fn refresh_vestings(
        &mut self,
        position: &mut Position,
        indices: &[u64],
        clock: Clock,
    ) -> Result<Liquidity> {
        let mut seen = BTreeSet::new();
        if let Some(&index) = indices.iter().find(|&&index| !seen.insert(index)) {
            return Err(AmmError::DuplicateVestingIndex(index));
        }
        let current_point = clock.current_point(self.config.activation_type());
        self.transact(position, |pool, position| {
            settle_position_fees(position, &pool.fee_growth)?;
            let mut released = Liquidity::ZERO;
            for &index in indices {
                released = released.safe_add(&position.release_vesting(index, current_point)?)?;
            }
            debug!(
                pool = %pool.address,
                owner = %position.owner(),
                schedules = indices.len(),
                released = released.get(),
                "vestings refreshed"
            );
            Ok(released)
        })
    }

    /// Locks all of the position's unlocked liquidity forever.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::NothingToLock`] if nothing is unlocked.
    pub fn permanent_lock_position(&mut self, position: &mut Position) -> Result<Liquidity> {
        self.transact(position, |pool, position| {
            let locked = position.permanent_lock_unlocked()?;
            pool.permanent_lock_liquidity = pool.permanent_lock_liquidity.safe_add(&locked)?;
            debug!(
                pool = %pool.address,
                owner = %position.owner(),
                locked = locked.get(),
                pool_locked = pool.permanent_lock_liquidity.get(),
                "position permanently locked"
            );
            Ok(locked)
        })
    }

    fn reward_mut(&mut self, index: usize) -> Result<&mut RewardInfo> {
        self.reward_infos
            .get_mut(index)
            .ok_or(AmmError::InvalidReward("reward index out of range"))
    }

    /// Brings every reward slot up to `clock`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if an accumulator
    /// overflows.
    pub fn update_rewards(&mut self, clock: Clock) -> Result<()> {
        let liquidity = self.liquidity.get();
        for reward in &mut self.reward_infos {
            reward.update(liquidity, clock.unix_timestamp)?;
        }
        Ok(())
    }

    /// Sets up reward slot `index` streaming `mint` over `duration`
    /// seconds per funding.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidReward`] for an unknown or already
    /// initialized slot, or a duration outside
    /// `[MIN_REWARD_DURATION, MAX_REWARD_DURATION]`.
    pub fn initialize_reward(
        &mut self,
        index: usize,
        mint: Address,
        funder: Address,
        duration: u64,
        clock: Clock,
    ) -> Result<()> {
        if !(MIN_REWARD_DURATION..=MAX_REWARD_DURATION).contains(&duration) {
            return Err(AmmError::InvalidReward("reward duration out of range"));
        }
        self.transact_pool(|pool| {
            pool.update_rewards(clock)?;
            let reward = pool.reward_mut(index)?;
            if reward.initialized {
                return Err(AmmError::InvalidReward("reward already initialized"));
            }
            *reward = RewardInfo {
                initialized: true,
                mint,
                funder,
                reward_duration: duration,
                last_update_time: clock.unix_timestamp,
                ..RewardInfo::default()
            };
            debug!(pool = %pool.address, index, %mint, duration, "reward initialized");
            Ok(())
        })
    }

    /// Adds `amount` to reward slot `index` and restarts its emission
    /// window. With `carry_forward`, emission that fell on empty liquidity
    /// is streamed again instead of staying claimable by the funder.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidReward`] for an unknown or uninitialized slot.
    /// - [`AmmError::Unauthorized`] unless `funder` funds the slot.
    /// - [`AmmError::InvalidQuantity`] if nothing would be streamed.
    pub fn fund_reward(
        &mut self,
        index: usize,
        funder: &Address,
        amount: Amount,
        carry_forward: bool,
        clock: Clock,
    ) -> Result<()> {
        self.transact_pool(|pool| {
            pool.update_rewards(clock)?;
            let reward = pool.reward_mut(index)?;
            if !reward.initialized {
                return Err(AmmError::InvalidReward("reward not initialized"));
            }
            if reward.funder != *funder {
                return Err(AmmError::Unauthorized);
            }
            let carried = if carry_forward {
                reward.take_ineligible_reward()?
            } else {
                0
            };
            let total = amount.get().safe_add(&carried)?;
            if total == 0 {
                return Err(AmmError::InvalidQuantity("reward funding is zero"));
            }
            reward.apply_funding(total, clock.unix_timestamp)?;
            let end = reward.reward_duration_end;
            debug!(pool = %pool.address, index, amount = amount.get(), carried, end, "reward funded");
            Ok(())
        })
    }

    /// Pays out the position's pending reward from slot `index`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidReward`] for an unknown slot.
    pub fn claim_reward(&mut self, position: &mut Position, index: usize, clock: Clock) -> Result<Amount> {
        self.transact(position, |pool, position| {
            pool.settle_position(position, clock)?;
            let amount = position.take_reward(index)?;
            debug!(pool = %pool.address, owner = %position.owner(), index, amount, "reward claimed");
            Ok(Amount::new(amount))
        })
    }

    /// Returns to the funder the emission of slot `index` that fell on
    /// empty liquidity. Only allowed once the emission window is over.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless `funder` funds the slot.
    /// - [`AmmError::InvalidReward`] while the window is still open.
    pub fn claim_ineligible_reward(&mut self, index: usize, funder: &Address, clock: Clock) -> Result<Amount> {
        self.transact_pool(|pool| {
            pool.update_rewards(clock)?;
            let reward = pool.reward_mut(index)?;
            if reward.funder != *funder {
                return Err(AmmError::Unauthorized);
            }
            if clock.unix_timestamp < reward.reward_duration_end {
                return Err(AmmError::InvalidReward("reward window still open"));
            }
            let amount = reward.take_ineligible_reward()?;
            debug!(pool = %pool.address, index, amount, "ineligible reward claimed");
            Ok(Amount::new(amount))
        })
    }

    /// Replaces the funder of slot `index`. Only the pool creator may do so.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless `authority` created the pool.
    /// - [`AmmError::InvalidReward`] for an unknown or uninitialized slot.
    pub fn update_reward_funder(&mut self, index: usize, authority: &Address, new_funder: Address) -> Result<()> {
        if *authority != self.creator {
            return Err(AmmError::Unauthorized);
        }
        let address = self.address;
        let reward = self.reward_mut(index)?;
        if !reward.initialized {
            return Err(AmmError::InvalidReward("reward not initialized"));
        }
        reward.funder = new_funder;
        debug!(pool = %address, index, funder = %new_funder, "reward funder updated");
        Ok(())
    }

    /// Changes the emission window length of slot `index`. Only the pool
    /// creator may do so, and only between windows.
    ///
    /// # Errors
    ///
    /// - [`AmmError::Unauthorized`] unless `authority` created the pool.
    /// - [`AmmError::InvalidReward`] for an unknown or uninitialized slot,
    ///   an open window, or an out-of-range duration.
    pub fn update_reward_duration(
        &mut self,
        index: usize,
        authority: &Address,
        duration: u64,
        clock: Clock,
    ) -> Result<()> {
        if *authority != self.creator {
            return Err(AmmError::Unauthorized);
        }
        if !(MIN_REWARD_DURATION..=MAX_REWARD_DURATION).contains(&duration) {
            return Err(AmmError::InvalidReward("reward duration out of range"));
        }
        let address = self.address;
        let reward = self.reward_mut(index)?;
        if !reward.initialized {
            return Err(AmmError::InvalidReward("reward not initialized"));
        }
        if clock.unix_timestamp < reward.reward_duration_end {
            return Err(AmmError::InvalidReward("reward window still open"));
        }
        reward.reward_duration = duration;
        debug!(pool = %address, index, duration, "reward duration updated");
        Ok(())
    }
}

impl SwapPool for Pool {
    /// Swaps along the curve toward the edge of the range.
    ///
    /// Transfer fees are applied on the way in and out: slippage limits
    /// compare the amounts the trader actually pays and receives.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolDisabled`] on a disabled pool.
    /// - [`AmmError::PoolNotActive`] before the activation point.
    /// - [`AmmError::PriceLimitReached`] if an exact-in swap would push the
    ///   price past the range.
    /// - [`AmmError::InsufficientLiquidity`] if an exact-out swap cannot be
    ///   filled inside the range.
    /// - [`AmmError::SlippageExceeded`] if a limit is violated.
    fn swap(
        &mut self,
        direction: TradeDirection,
        spec: SwapSpec,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        self.transact_pool(|pool| pool.execute_swap(direction, spec, has_referral, clock, true))
    }

    fn quote(
        &self,
        direction: TradeDirection,
        spec: SwapSpec,
        has_referral: bool,
        clock: Clock,
    ) -> Result<SwapResult> {
        let mut pool = self.clone();
        pool.execute_swap(direction, spec, has_referral, clock, false)
    }

    fn token_pair(&self) -> &TokenPair {
        &self.tokens
    }

    fn current_fee_numerator(&self, clock: Clock) -> Result<u64> {
        let current_point = clock.current_point(self.config.activation_type());
        self.config
            .fees()
            .current_fee_numerator(current_point, self.activation_point, self.dynamic_fee.as_ref())
    }
}

impl LiquidityPool for Pool {
    /// Deposits the tokens backing `delta` at the current price.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PoolDisabled`] on a disabled pool.
    /// - [`AmmError::InvalidQuantity`] for a zero delta.
    /// - [`AmmError::SlippageExceeded`] if a required amount exceeds its
    ///   threshold.
    fn add_liquidity(
        &mut self,
        position: &mut Position,
        delta: Liquidity,
        max_a: Amount,
        max_b: Amount,
        clock: Clock,
    ) -> Result<TokenAmounts> {
        self.ensure_enabled()?;
        if delta.is_zero() {
            return Err(AmmError::InvalidQuantity("liquidity delta is zero"));
        }
        self.transact(position, |pool, position| {
            pool.settle_position(position, clock)?;
            let (amount_a, amount_b) = amounts_from_liquidity(
                delta.get(),
                pool.sqrt_price,
                pool.config.sqrt_min_price(),
                pool.config.sqrt_max_price(),
                Rounding::Up,
            )?;
            let required = TokenAmounts {
                amount_a: pool.tokens.token_a().amount_to_send(Amount::new(amount_a))?,
                amount_b: pool.tokens.token_b().amount_to_send(Amount::new(amount_b))?,
            };
            if required.amount_a > max_a || required.amount_b > max_b {
                return Err(AmmError::SlippageExceeded);
            }
            pool.liquidity = pool.liquidity.safe_add(&delta)?;
            position.add_unlocked(delta)?;
            pool.deposit_to_vault(TokenSide::A, amount_a)?;
            pool.deposit_to_vault(TokenSide::B, amount_b)?;
            debug!(
                pool = %pool.address,
                owner = %position.owner(),
                delta = delta.get(),
                amount_a,
                amount_b,
                liquidity = pool.liquidity.get(),
                "liquidity added"
            );
            Ok(required)
        })
    }

    /// Withdraws the tokens backing `delta` of unlocked liquidity.
    ///
    /// # Errors
    ///
    /// - [`AmmError::InvalidQuantity`] for a zero delta.
    /// - [`AmmError::InsufficientUnlockedLiquidity`] if `delta` exceeds the
    ///   unlocked bucket.
    /// - [`AmmError::SlippageExceeded`] if a returned amount is below its
    ///   minimum.
    fn remove_liquidity(
        &mut self,
        position: &mut Position,
        delta: Liquidity,
        min_a: Amount,
        min_b: Amount,
        clock: Clock,
    ) -> Result<TokenAmounts> {
        if delta.is_zero() {
            return Err(AmmError::InvalidQuantity("liquidity delta is zero"));
        }
        if delta > position.unlocked_liquidity() {
            return Err(AmmError::InsufficientUnlockedLiquidity);
        }
        self.transact(position, |pool, position| {
            pool.settle_position(position, clock)?;
            let (amount_a, amount_b) = amounts_from_liquidity(
                delta.get(),
                pool.sqrt_price,
                pool.config.sqrt_min_price(),
                pool.config.sqrt_max_price(),
                Rounding::Down,
            )?;
            let returned = TokenAmounts {
                amount_a: pool.amount_received(TokenSide::A, amount_a),
                amount_b: pool.amount_received(TokenSide::B, amount_b),
            };
            if returned.amount_a < min_a || returned.amount_b < min_b {
                return Err(AmmError::SlippageExceeded);
            }
            position.remove_unlocked(delta)?;
            pool.liquidity = pool.liquidity.safe_sub(&delta)?;
            pool.withdraw_from_vault(TokenSide::A, amount_a)?;
            pool.withdraw_from_vault(TokenSide::B, amount_b)?;
            debug!(
                pool = %pool.address,
                owner = %position.owner(),
                delta = delta.get(),
                amount_a,
                amount_b,
                liquidity = pool.liquidity.get(),
                "liquidity removed"
            );
            Ok(returned)
        })
    }

    /// Settles and pays out the position's fees. Nothing owed is not an
    /// error.
    fn claim_position_fee(&mut self, position: &mut Position) -> Result<TokenAmounts> {
        self.transact(position, |pool, position| {
            settle_position_fees(position, &pool.fee_growth)?;
            let (fee_a, fee_b) = position.take_fees()?;
            if fee_a == 0 && fee_b == 0 {
                return Ok(TokenAmounts::default());
            }
            pool.withdraw_from_vault(TokenSide::A, fee_a)?;
            pool.withdraw_from_vault(TokenSide::B, fee_b)?;
            debug!(pool = %pool.address, owner = %position.owner(), fee_a, fee_b, "position fee claimed");
            Ok(TokenAmounts {
                amount_a: pool.amount_received(TokenSide::A, fee_a),
                amount_b: pool.amount_received(TokenSide::B, fee_b),
            })
        })
    }

    fn total_liquidity(&self) -> Liquidity {
        self.liquidity
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::config::{CollectFeeMode, ConfigParameters};
    use crate::domain::{ActivationType, BasisPoints};
    use crate::fee::{DynamicFeeParameters, PoolFeeParameters, ReferralFeeSource, TransferFee};
    use crate::math::ONE_Q64;

    const START: u64 = 1_000;
    /// 10¹² tokens of liquidity.
    const DEEP: u128 = 1_000_000_000_000 << 64;
    /// Reserve of each token in a `DEEP` pool at price 1 over `[½, 2]`.
    const DEEP_RESERVE: u64 = 500_000_000_000;

    fn addr(byte: u8) -> Address {
        Address::from_bytes([byte; 32])
    }

    fn clock(at: u64) -> Clock {
        Clock::new(at, at)
    }

    fn fees(modifier: FeeModifier) -> PoolFeeParameters {
        PoolFeeParameters {
            cliff_fee_numerator: 10_000_000, // 1%
            modifier,
            protocol_fee_percent: 20,
            partner_fee_percent: 10,
            referral_fee_percent: 5,
            referral_fee_source: ReferralFeeSource::Protocol,
        }
    }

    fn config_with(collect_fee_mode: CollectFeeMode, modifier: FeeModifier) -> Config {
        let Ok(config) = Config::new(ConfigParameters {
            index: 1,
            fees: fees(modifier),
            sqrt_min_price: ONE_Q64 / 2,
            sqrt_max_price: ONE_Q64 * 2,
            activation_type: ActivationType::Timestamp,
            collect_fee_mode,
        }) else {
            panic!("expected Ok");
        };
        config
    }

    fn params(liquidity: u128) -> InitializePoolParameters {
        InitializePoolParameters {
            address: addr(9),
            token_a: Token::new(addr(1)),
            token_b: Token::new(addr(2)),
            creator: addr(3),
            partner: Some(addr(4)),
            liquidity: Liquidity::new(liquidity),
            sqrt_price: ONE_Q64,
            activation_point: None,
        }
    }

    fn build(config: Config, params: InitializePoolParameters) -> (Pool, Position) {
        let Ok((pool, position, _)) = Pool::initialize(config, params, clock(START)) else {
            panic!("expected Ok");
        };
        (pool, position)
    }

    fn pool(liquidity: u128, collect_fee_mode: CollectFeeMode) -> (Pool, Position) {
        build(config_with(collect_fee_mode, FeeModifier::None), params(liquidity))
    }

    fn swap_in(pool: &mut Pool, direction: TradeDirection, amount: u64, referral: bool) -> SwapResult {
        let Ok(result) = pool.swap_exact_in(direction, Amount::new(amount), Amount::ZERO, referral, clock(START))
        else {
            panic!("expected Ok");
        };
        result
    }

    // -- initialize ---------------------------------------------------------

    #[test]
    fn initialize_reports_deposit() {
        let Ok((pool, position, deposit)) = Pool::initialize(
            config_with(CollectFeeMode::BothToken, FeeModifier::None),
            params(DEEP),
            clock(START),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(deposit.amount_a, Amount::new(DEEP_RESERVE));
        assert_eq!(deposit.amount_b, Amount::new(DEEP_RESERVE));
        assert_eq!(pool.vault_amount(TokenSide::A), DEEP_RESERVE);
        assert_eq!(position.unlocked_liquidity(), Liquidity::new(DEEP));
        assert_eq!(pool.activation_point(), START);
        assert_eq!(pool.metrics().total_position, 1);
    }

    #[test]
    fn initialize_rejects_price_outside_range() {
        let mut p = params(DEEP);
        p.sqrt_price = ONE_Q64 * 3;
        let config = config_with(CollectFeeMode::BothToken, FeeModifier::None);
        assert_eq!(Pool::initialize(config, p, clock(START)).map(|_| ()), Err(AmmError::PriceOutOfRange));
    }

    #[test]
    fn initialize_rejects_dust_liquidity() {
        let config = config_with(CollectFeeMode::BothToken, FeeModifier::None);
        assert!(matches!(
            Pool::initialize(config, params(MIN_LP_AMOUNT - 1), clock(START)),
            Err(AmmError::InvalidQuantity(_))
        ));
    }

    #[test]
    fn initialize_rejects_same_mint() {
        let mut p = params(DEEP);
        p.token_b = p.token_a;
        let config = config_with(CollectFeeMode::BothToken, FeeModifier::None);
        assert!(matches!(
            Pool::initialize(config, p, clock(START)),
            Err(AmmError::InvalidToken(_))
        ));
    }

    // -- swap ---------------------------------------------------------------

    #[test]
    fn exact_in_takes_fee_from_output() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        let result = swap_in(&mut pool, TradeDirection::AToB, 1_000_000, true);
        assert_eq!(result.amount_out(), Amount::new(989_999));
        assert_eq!(result.fee_side(), TokenSide::B);
        let fee = result.fee();
        assert_eq!((fee.lp, fee.protocol, fee.partner, fee.referral), (7_000, 1_500, 1_000, 500));
        assert_eq!(pool.protocol_fee().amount_b, Amount::new(1_500));
        assert_eq!(pool.partner_fee().amount_b, Amount::new(1_000));
        assert_eq!(pool.vault_amount(TokenSide::A), DEEP_RESERVE + 1_000_000);
        assert_eq!(pool.vault_amount(TokenSide::B), DEEP_RESERVE - 989_999 - 500);
        assert_eq!(pool.metrics().total_referral_b_fee, 500);
        assert!(pool.sqrt_price() < ONE_Q64);
    }

    #[test]
    fn only_b_takes_fee_from_input_when_buying_a() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::OnlyB);
        let result = swap_in(&mut pool, TradeDirection::BToA, 1_000_000, false);
        assert_eq!(result.amount_in(), Amount::new(1_000_000));
        assert_eq!(result.fee_side(), TokenSide::B);
        assert_eq!(result.fee().total(), Ok(10_000));
        assert!(pool.fee_growth().per_liquidity_a.is_zero());
        assert!(!pool.fee_growth().per_liquidity_b.is_zero());
        assert!(pool.sqrt_price() > ONE_Q64);
    }

    #[test]
    fn exact_out_delivers_requested_amount() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        let Ok(result) = pool.swap_exact_out(
            TradeDirection::BToA,
            Amount::new(1_000),
            Amount::MAX,
            false,
            clock(START),
        ) else {
            panic!("expected Ok");
        };
        assert_eq!(result.amount_out(), Amount::new(1_000));
        assert_eq!(result.fee().total(), Ok(11));
        assert_eq!(result.fee_side(), TokenSide::A);
        assert!(result.amount_in().get() >= 1_011);
    }

    #[test]
    fn slippage_failure_leaves_pool_untouched() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        let before = pool.clone();
        assert_eq!(
            pool.swap_exact_in(
                TradeDirection::AToB,
                Amount::new(1_000_000),
                Amount::new(990_000),
                false,
                clock(START)
            ),
            Err(AmmError::SlippageExceeded)
        );
        assert_eq!(pool, before);

        assert_eq!(
            pool.swap_exact_out(TradeDirection::BToA, Amount::new(1_000), Amount::new(1_000), false, clock(START)),
            Err(AmmError::SlippageExceeded)
        );
        assert_eq!(pool, before);
    }

    #[test]
    fn exact_in_past_range_hits_price_limit() {
        let (mut pool, _) = pool(MIN_LP_AMOUNT, CollectFeeMode::BothToken);
        assert_eq!(
            pool.swap_exact_in(TradeDirection::AToB, Amount::new(1_000), Amount::ZERO, false, clock(START)),
            Err(AmmError::PriceLimitReached)
        );
    }

    #[test]
    fn exact_out_past_range_is_insufficient_liquidity() {
        let (mut pool, _) = pool(MIN_LP_AMOUNT, CollectFeeMode::BothToken);
        assert_eq!(
            pool.swap_exact_out(TradeDirection::AToB, Amount::new(1_000), Amount::MAX, false, clock(START)),
            Err(AmmError::InsufficientLiquidity)
        );
    }

    #[test]
    fn swap_waits_for_activation() {
        let mut p = params(DEEP);
        p.activation_point = Some(START + 100);
        let (mut pool, _) = build(config_with(CollectFeeMode::BothToken, FeeModifier::None), p);
        assert_eq!(
            pool.swap_exact_in(TradeDirection::AToB, Amount::new(10), Amount::ZERO, false, clock(START)),
            Err(AmmError::PoolNotActive)
        );
        assert!(pool
            .swap_exact_in(TradeDirection::AToB, Amount::new(10), Amount::ZERO, false, clock(START + 100))
            .is_ok());
    }

    #[test]
    fn disabled_pool_still_allows_withdrawal() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        pool.set_status(PoolStatus::Disabled);
        assert_eq!(
            pool.swap_exact_in(TradeDirection::AToB, Amount::new(10), Amount::ZERO, false, clock(START)),
            Err(AmmError::PoolDisabled)
        );
        assert_eq!(
            pool.add_liquidity(&mut position, Liquidity::new(1 << 64), Amount::MAX, Amount::MAX, clock(START)),
            Err(AmmError::PoolDisabled)
        );
        assert!(pool
            .remove_liquidity(&mut position, Liquidity::new(1 << 64), Amount::ZERO, Amount::ZERO, clock(START))
            .is_ok());
    }

    #[test]
    fn quote_matches_swap_without_mutation() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        let before = pool.clone();
        let Ok(quote) = pool.quote_exact_in(TradeDirection::AToB, Amount::new(50_000), false, clock(START)) else {
            panic!("expected Ok");
        };
        assert_eq!(pool, before);
        let result = swap_in(&mut pool, TradeDirection::AToB, 50_000, false);
        assert_eq!(quote, result);
    }

    #[test]
    fn transfer_fee_reduces_curve_input() {
        let Ok(transfer_fee) = TransferFee::new(BasisPoints::new(100), Amount::new(1_000_000)) else {
            panic!("expected Ok");
        };
        let mut p = params(DEEP);
        p.token_a = Token::with_transfer_fee(addr(1), transfer_fee);
        let (mut pool, _) = build(config_with(CollectFeeMode::BothToken, FeeModifier::None), p);
        let vault_before = pool.vault_amount(TokenSide::A);
        let result = swap_in(&mut pool, TradeDirection::AToB, 1_000_000, false);
        assert_eq!(result.amount_in(), Amount::new(1_000_000));
        assert_eq!(pool.vault_amount(TokenSide::A), vault_before + 990_000);
    }

    #[test]
    fn dynamic_fee_tracks_volatility() {
        let dynamic = DynamicFeeParameters {
            bin_step: 1,
            filter_period: 10,
            decay_period: 120,
            reduction_factor: 5_000,
            max_volatility_accumulator: 14_460_000,
            variable_fee_control: 1_000_000,
            max_fee_numerator: 100_000_000,
        };
        let (mut pool, _) = build(
            config_with(CollectFeeMode::BothToken, FeeModifier::Dynamic(dynamic)),
            params(DEEP),
        );
        assert_eq!(pool.current_fee_numerator(clock(START)), Ok(10_000_000));
        swap_in(&mut pool, TradeDirection::AToB, 10_000_000_000, false);
        let Some(state) = pool.dynamic_fee() else {
            panic!("dynamic pool carries state");
        };
        assert!(state.volatility_accumulator > 0);
        assert!(matches!(pool.current_fee_numerator(clock(START)), Ok(fee) if fee > 10_000_000));
    }

    // -- positions and fees -------------------------------------------------

    #[test]
    fn position_from_other_pool_rejected() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        let mut other = params(DEEP);
        other.address = addr(10);
        let (_, mut foreign) = build(config_with(CollectFeeMode::BothToken, FeeModifier::None), other);
        assert_eq!(pool.claim_position_fee(&mut foreign), Err(AmmError::PositionMismatch));
    }

    #[test]
    fn claim_position_fee_is_noop_when_nothing_owed() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        let before = pool.clone();
        assert_eq!(pool.claim_position_fee(&mut position), Ok(TokenAmounts::default()));
        assert_eq!(pool, before);
    }

    #[test]
    fn sole_provider_collects_lp_fee() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        swap_in(&mut pool, TradeDirection::AToB, 1_000_000, false);
        let Ok(claimed) = pool.claim_position_fee(&mut position) else {
            panic!("expected Ok");
        };
        // 7_000 LP share, less rounding.
        assert!(claimed.amount_b.get() >= 6_999 && claimed.amount_b.get() <= 7_000);
        assert_eq!(position.metrics().total_claimed_b_fee, claimed.amount_b.get());
        assert_eq!(pool.claim_position_fee(&mut position), Ok(TokenAmounts::default()));
    }

    #[test]
    fn protocol_and_partner_claims() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        swap_in(&mut pool, TradeDirection::AToB, 1_000_000, false);

        assert_eq!(
            pool.claim_partner_fee(&addr(5), Amount::MAX, Amount::MAX),
            Err(AmmError::Unauthorized)
        );
        let Ok(partial) = pool.claim_partner_fee(&addr(4), Amount::MAX, Amount::new(400)) else {
            panic!("expected Ok");
        };
        assert_eq!(partial.amount_b, Amount::new(400));
        assert_eq!(pool.partner_fee().amount_b, Amount::new(600));

        let Ok(protocol) = pool.claim_protocol_fee() else {
            panic!("expected Ok");
        };
        assert_eq!(protocol.amount_b, Amount::new(2_000));
        assert_eq!(pool.protocol_fee(), TokenAmounts::default());
    }

    #[test]
    fn pool_without_partner_gives_partner_share_to_lps() {
        let mut p = params(DEEP);
        p.partner = None;
        let (mut pool, _) = build(config_with(CollectFeeMode::BothToken, FeeModifier::None), p);
        let result = swap_in(&mut pool, TradeDirection::AToB, 1_000_000, false);
        assert_eq!(result.fee().partner, 0);
        assert_eq!(result.fee().lp, 8_000);
    }

    // -- locks --------------------------------------------------------------

    #[test]
    fn refresh_rejects_repeated_index() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        let schedule = VestingParameters {
            cliff_point: None,
            period_frequency: 0,
            cliff_unlock_liquidity: 1_000,
            liquidity_per_period: 0,
            number_of_period: 0,
        };
        let Ok(()) = pool.lock_position(&mut position, 7, &schedule, clock(START)) else {
            panic!("expected Ok");
        };
        assert_eq!(
            pool.refresh_vestings(&mut position, &[7, 7], clock(START)),
            Err(AmmError::DuplicateVestingIndex(7))
        );
        assert_eq!(
            pool.refresh_vestings(&mut position, &[8], clock(START)),
            Err(AmmError::VestingNotFound(8))
        );
        assert_eq!(pool.refresh_vestings(&mut position, &[7], clock(START)), Ok(Liquidity::new(1_000)));
        assert!(position.vesting(7).is_none());
    }

    #[test]
    fn refresh_releases_each_schedule_in_turn() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        let later = VestingParameters {
            cliff_point: Some(START + 50),
            period_frequency: 10,
            cliff_unlock_liquidity: 100,
            liquidity_per_period: 10,
            number_of_period: 4,
        };
        let earlier = VestingParameters {
            cliff_point: Some(START + 20),
            period_frequency: 20,
            cliff_unlock_liquidity: 50,
            liquidity_per_period: 30,
            number_of_period: 4,
        };
        let Ok(()) = pool.lock_position(&mut position, 5, &later, clock(START)) else {
            panic!("expected Ok");
        };
        let Ok(()) = pool.lock_position(&mut position, 2, &earlier, clock(START)) else {
            panic!("expected Ok");
        };
        assert_eq!(position.vested_liquidity(), Liquidity::new(140 + 170));

        assert_eq!(
            pool.refresh_vestings(&mut position, &[2, 5], clock(START + 70)),
            Ok(Liquidity::new(230))
        );
        let released = |position: &Position, index| position.vesting(index).map(Vesting::total_released_liquidity);
        assert_eq!(released(&position, 2), Some(110));
        assert_eq!(released(&position, 5), Some(120));
        assert_eq!(position.vested_liquidity(), Liquidity::new(80));

        // A missing index anywhere in the list undoes the whole refresh.
        let (pool_before, position_before) = (pool.clone(), position.clone());
        assert_eq!(
            pool.refresh_vestings(&mut position, &[5, 9], clock(START + 100)),
            Err(AmmError::VestingNotFound(9))
        );
        assert_eq!(position, position_before);
        assert_eq!(pool, pool_before);

        assert_eq!(
            pool.refresh_vestings(&mut position, &[2, 5], clock(START + 70)),
            Ok(Liquidity::ZERO)
        );
    }

    #[test]
    fn permanent_lock_counts_on_pool() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        assert_eq!(pool.permanent_lock_position(&mut position), Ok(Liquidity::new(DEEP)));
        assert_eq!(pool.permanent_lock_liquidity(), Liquidity::new(DEEP));
        assert_eq!(pool.liquidity(), Liquidity::new(DEEP));
        assert_eq!(pool.permanent_lock_position(&mut position), Err(AmmError::NothingToLock));
    }

    // -- rewards ------------------------------------------------------------

    #[test]
    fn sole_provider_earns_full_emission() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        let Ok(()) = pool.initialize_reward(0, addr(20), addr(5), 86_400, clock(START)) else {
            panic!("expected Ok");
        };
        let Ok(()) = pool.fund_reward(0, &addr(5), Amount::new(86_400_000), false, clock(START)) else {
            panic!("expected Ok");
        };
        let Ok(claimed) = pool.claim_reward(&mut position, 0, clock(START + 200_000)) else {
            panic!("expected Ok");
        };
        assert!(claimed.get() >= 86_399_999 && claimed.get() <= 86_400_000);
        assert_eq!(pool.claim_reward(&mut position, 0, clock(START + 200_001)), Ok(Amount::ZERO));
    }

    #[test]
    fn reward_setup_is_guarded() {
        let (mut pool, _) = pool(DEEP, CollectFeeMode::BothToken);
        assert!(matches!(
            pool.initialize_reward(0, addr(20), addr(5), 60, clock(START)),
            Err(AmmError::InvalidReward(_))
        ));
        assert!(matches!(
            pool.initialize_reward(NUM_REWARDS, addr(20), addr(5), 86_400, clock(START)),
            Err(AmmError::InvalidReward(_))
        ));
        let Ok(()) = pool.initialize_reward(1, addr(20), addr(5), 86_400, clock(START)) else {
            panic!("expected Ok");
        };
        assert_eq!(
            pool.fund_reward(1, &addr(6), Amount::new(1), false, clock(START)),
            Err(AmmError::Unauthorized)
        );
        assert_eq!(pool.update_reward_funder(1, &addr(5), addr(6)), Err(AmmError::Unauthorized));
        assert_eq!(pool.update_reward_funder(1, &addr(3), addr(6)), Ok(()));
        assert!(pool.fund_reward(1, &addr(6), Amount::new(1_000), false, clock(START)).is_ok());
        assert!(matches!(
            pool.update_reward_duration(1, &addr(3), 100_000, clock(START)),
            Err(AmmError::InvalidReward(_))
        ));
    }

    #[test]
    fn emission_on_empty_pool_returns_to_funder() {
        let (mut pool, mut position) = pool(DEEP, CollectFeeMode::BothToken);
        let Ok(()) = pool.initialize_reward(0, addr(20), addr(5), 86_400, clock(START)) else {
            panic!("expected Ok");
        };
        let Ok(()) = pool.fund_reward(0, &addr(5), Amount::new(86_400_000), false, clock(START)) else {
            panic!("expected Ok");
        };
        let Ok(_) = pool.remove_all_liquidity(&mut position, Amount::ZERO, Amount::ZERO, clock(START)) else {
            panic!("expected Ok");
        };
        assert!(pool.liquidity().is_zero());
        assert!(matches!(
            pool.claim_ineligible_reward(0, &addr(5), clock(START + 100)),
            Err(AmmError::InvalidReward(_))
        ));
        assert_eq!(
            pool.claim_ineligible_reward(0, &addr(5), clock(START + 86_400)),
            Ok(Amount::new(86_400_000))
        );
    }
}
