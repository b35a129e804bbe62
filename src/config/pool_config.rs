//! Immutable pool template.

use crate::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
use crate::domain::{ActivationType, TokenSide, TradeDirection};
use crate::error::{AmmError, Result};
use crate::fee::PoolFeeParameters;
use crate::math::FeeSide;

/// Token the trading fee is collected in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CollectFeeMode {
    /// The fee is withheld from whichever token leaves the pool.
    #[default]
    BothToken,
    /// The fee is always taken in token B: from the input when buying A,
    /// from the output when selling A.
    OnlyB,
}

impl CollectFeeMode {
    /// Where a swap in `direction` takes its fee, and in which token.
    #[must_use]
    pub const fn fee_side(&self, direction: TradeDirection) -> (FeeSide, TokenSide) {
        match (self, direction) {
            (Self::OnlyB, TradeDirection::BToA) => (FeeSide::Input, TokenSide::B),
            (_, direction) => (FeeSide::Output, direction.output_side()),
        }
    }
}

/// Raw, unvalidated parameters of a [`Config`].
///
/// This is the shape a binding layer deserializes; [`Config::new`] turns it
/// into a checked config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfigParameters {
    /// Identity of the config.
    pub index: u64,
    /// Fee schedule and split.
    pub fees: PoolFeeParameters,
    /// Lowest square-root price of pools under this config.
    pub sqrt_min_price: u128,
    /// Highest square-root price of pools under this config.
    pub sqrt_max_price: u128,
    /// Clock unit of activation and vesting points.
    pub activation_type: ActivationType,
    /// Token the trading fee is collected in.
    pub collect_fee_mode: CollectFeeMode,
}

/// A validated pool template.
///
/// Every pool created from a config shares its fee schedule, price range,
/// activation unit and fee collection mode.
///
/// # Examples
///
/// ```
/// use rangepool::config::{CollectFeeMode, Config, ConfigParameters};
/// use rangepool::constants::{MAX_SQRT_PRICE, MIN_SQRT_PRICE};
/// use rangepool::domain::ActivationType;
/// use rangepool::fee::{FeeModifier, PoolFeeParameters, ReferralFeeSource};
///
/// let config = Config::new(ConfigParameters {
///     index: 0,
///     fees: PoolFeeParameters {
///         cliff_fee_numerator: 2_500_000,
///         modifier: FeeModifier::None,
///         protocol_fee_percent: 20,
///         partner_fee_percent: 0,
///         referral_fee_percent: 20,
///         referral_fee_source: ReferralFeeSource::Protocol,
///     },
///     sqrt_min_price: MIN_SQRT_PRICE,
///     sqrt_max_price: MAX_SQRT_PRICE,
///     activation_type: ActivationType::Timestamp,
///     collect_fee_mode: CollectFeeMode::BothToken,
/// })
/// .expect("valid config");
/// assert_eq!(config.index(), 0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(try_from = "ConfigParameters", into = "ConfigParameters")
)]
pub struct Config {
    params: ConfigParameters,
}

impl Config {
    /// Validates `params` and wraps them.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate).
    pub fn new(params: ConfigParameters) -> Result<Self> {
        let config = Self { params };
        config.validate()?;
        Ok(config)
    }

    /// Checks every invariant of the template.
    ///
    /// # Errors
    ///
    /// - [`AmmError::PriceOutOfRange`] if the price range is empty or leaves
    ///   `[MIN_SQRT_PRICE, MAX_SQRT_PRICE]`.
    /// - [`AmmError::InvalidFee`] for an invalid fee schedule or split.
    pub fn validate(&self) -> Result<()> {
        let p = &self.params;
        if p.sqrt_min_price < MIN_SQRT_PRICE || p.sqrt_max_price > MAX_SQRT_PRICE {
            return Err(AmmError::PriceOutOfRange);
        }
        if p.sqrt_min_price >= p.sqrt_max_price {
            return Err(AmmError::PriceOutOfRange);
        }
        p.fees.validate()
    }

    /// Identity of the config.
    #[must_use]
    pub const fn index(&self) -> u64 {
        self.params.index
    }

    /// Fee schedule and split.
    #[must_use]
    pub const fn fees(&self) -> &PoolFeeParameters {
        &self.params.fees
    }

    /// Lowest square-root price.
    #[must_use]
    pub const fn sqrt_min_price(&self) -> u128 {
        self.params.sqrt_min_price
    }

    /// Highest square-root price.
    #[must_use]
    pub const fn sqrt_max_price(&self) -> u128 {
        self.params.sqrt_max_price
    }

    /// Clock unit of activation and vesting points.
    #[must_use]
    pub const fn activation_type(&self) -> ActivationType {
        self.params.activation_type
    }

    /// Token the trading fee is collected in.
    #[must_use]
    pub const fn collect_fee_mode(&self) -> CollectFeeMode {
        self.params.collect_fee_mode
    }

    /// The parameters this config was built from.
    #[must_use]
    pub const fn parameters(&self) -> &ConfigParameters {
        &self.params
    }

    /// Base fee numerator of a pool activated at `activation_point`.
    ///
    /// # Errors
    ///
    /// Propagates fee scheduler errors.
    pub fn current_base_fee_numerator(&self, current_point: u64, activation_point: u64) -> Result<u64> {
        self.params
            .fees
            .current_base_fee_numerator(current_point, activation_point)
    }
}

impl TryFrom<ConfigParameters> for Config {
    type Error = AmmError;

    fn try_from(params: ConfigParameters) -> Result<Self> {
        Self::new(params)
    }
}

impl From<Config> for ConfigParameters {
    fn from(config: Config) -> Self {
        config.params
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::fee::{FeeModifier, FeeScheduler, FeeSchedulerMode, ReferralFeeSource};

    fn params() -> ConfigParameters {
        ConfigParameters {
            index: 7,
            fees: PoolFeeParameters {
                cliff_fee_numerator: 10_000_000,
                modifier: FeeModifier::Decay(FeeScheduler {
                    number_of_period: 4,
                    period_frequency: 60,
                    reduction_factor: 1_000_000,
                    mode: FeeSchedulerMode::Linear,
                }),
                protocol_fee_percent: 20,
                partner_fee_percent: 10,
                referral_fee_percent: 5,
                referral_fee_source: ReferralFeeSource::Protocol,
            },
            sqrt_min_price: MIN_SQRT_PRICE,
            sqrt_max_price: MAX_SQRT_PRICE,
            activation_type: ActivationType::Slot,
            collect_fee_mode: CollectFeeMode::OnlyB,
        }
    }

    #[test]
    fn valid_params_accepted() {
        let Ok(config) = Config::new(params()) else {
            panic!("expected Ok");
        };
        assert_eq!(config.index(), 7);
        assert_eq!(config.collect_fee_mode(), CollectFeeMode::OnlyB);
        assert_eq!(config.current_base_fee_numerator(120, 0), Ok(8_000_000));
    }

    #[test]
    fn inverted_range_rejected() {
        let mut p = params();
        p.sqrt_min_price = p.sqrt_max_price;
        assert_eq!(Config::new(p), Err(AmmError::PriceOutOfRange));
    }

    #[test]
    fn range_outside_envelope_rejected() {
        let mut p = params();
        p.sqrt_min_price = MIN_SQRT_PRICE - 1;
        assert_eq!(Config::new(p), Err(AmmError::PriceOutOfRange));
    }

    #[test]
    fn bad_split_rejected() {
        let mut p = params();
        p.fees.protocol_fee_percent = 95;
        assert!(matches!(Config::new(p), Err(AmmError::InvalidFee(_))));
    }

    #[test]
    fn fee_side_by_mode() {
        assert_eq!(
            CollectFeeMode::BothToken.fee_side(TradeDirection::BToA),
            (FeeSide::Output, TokenSide::A)
        );
        assert_eq!(
            CollectFeeMode::OnlyB.fee_side(TradeDirection::BToA),
            (FeeSide::Input, TokenSide::B)
        );
        assert_eq!(
            CollectFeeMode::OnlyB.fee_side(TradeDirection::AToB),
            (FeeSide::Output, TokenSide::B)
        );
    }

    #[cfg(feature = "serde")]
    #[test]
    fn json_round_trip_validates() {
        let Ok(json) = serde_json::to_string(&params()) else {
            panic!("serialize");
        };
        let Ok(config) = serde_json::from_str::<Config>(&json) else {
            panic!("deserialize");
        };
        assert_eq!(*config.parameters(), params());

        let mut bad = params();
        bad.sqrt_max_price = bad.sqrt_min_price;
        let Ok(json) = serde_json::to_string(&bad) else {
            panic!("serialize");
        };
        assert!(serde_json::from_str::<Config>(&json).is_err());
    }
}
