//! Partition of a trading fee between its recipients.

use core::fmt;

use crate::constants::PERCENT_MAX;
use crate::error::{AmmError, Result};

/// Where the referral share of a fee is taken from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReferralFeeSource {
    /// The referrer is paid out of the protocol share.
    #[default]
    Protocol,
    /// The referrer is paid out of the liquidity providers' share.
    LiquidityProvider,
}

/// A trading fee split into its four recipients.
///
/// `lp + protocol + partner + referral` always equals the fee that was
/// split.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct FeeBreakdown {
    /// Share accrued to positions through the fee growth accumulator.
    pub lp: u64,
    /// Share owed to the protocol treasury.
    pub protocol: u64,
    /// Share owed to the pool partner.
    pub partner: u64,
    /// Share paid to the swap's referrer.
    pub referral: u64,
}

impl FeeBreakdown {
    /// Sum of all shares.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`] if the shares do not fit
    /// `u64`, which cannot happen for a breakdown produced by
    /// [`split_fee`].
    pub fn total(&self) -> Result<u64> {
        self.lp
            .checked_add(self.protocol)
            .and_then(|v| v.checked_add(self.partner))
            .and_then(|v| v.checked_add(self.referral))
            .ok_or(AmmError::ArithmeticOverflow("fee total"))
    }
}

impl fmt::Display for FeeBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "lp={} protocol={} partner={} referral={}",
            self.lp, self.protocol, self.partner, self.referral
        )
    }
}

fn percent_of(total: u64, percent: u8) -> Result<u64> {
    let share = u128::from(total) * u128::from(percent) / u128::from(PERCENT_MAX);
    u64::try_from(share).map_err(|_| AmmError::ArithmeticOverflow("fee share"))
}

/// Checks that a set of split percentages is coherent for `source`.
///
/// # Errors
///
/// Returns [`AmmError::InvalidFee`] if a percentage exceeds 100, if the
/// shares sum above 100, or if a protocol-funded referral exceeds the
/// protocol share.
pub fn validate_split(
    protocol_percent: u8,
    partner_percent: u8,
    referral_percent: u8,
    source: ReferralFeeSource,
) -> Result<()> {
    let owned = u16::from(protocol_percent) + u16::from(partner_percent);
    match source {
        ReferralFeeSource::Protocol => {
            if referral_percent > protocol_percent {
                return Err(AmmError::InvalidFee("referral share exceeds protocol share"));
            }
            if owned > u16::from(PERCENT_MAX) {
                return Err(AmmError::InvalidFee("fee shares exceed 100%"));
            }
        }
        ReferralFeeSource::LiquidityProvider => {
            if owned + u16::from(referral_percent) > u16::from(PERCENT_MAX) {
                return Err(AmmError::InvalidFee("fee shares exceed 100%"));
            }
        }
    }
    Ok(())
}

/// Splits `total` into LP, protocol, partner and referral shares.
///
/// Each named share is `floor(total × percent / 100)`; the liquidity
/// providers receive whatever remains, so rounding dust always goes to
/// them. Without a referrer the referral share stays with its source.
///
/// # Examples
///
/// ```
/// use rangepool::fee::{split_fee, ReferralFeeSource};
///
/// let with_ref = split_fee(1_000, 20, 10, 5, ReferralFeeSource::Protocol, true).expect("valid");
/// assert_eq!((with_ref.lp, with_ref.protocol, with_ref.partner, with_ref.referral), (700, 150, 100, 50));
///
/// let from_lp = split_fee(1_000, 20, 10, 5, ReferralFeeSource::LiquidityProvider, true).expect("valid");
/// assert_eq!((from_lp.lp, from_lp.protocol, from_lp.partner, from_lp.referral), (650, 200, 100, 50));
/// ```
///
/// # Errors
///
/// Returns the [`validate_split`] error for incoherent percentages.
pub fn split_fee(
    total: u64,
    protocol_percent: u8,
    partner_percent: u8,
    referral_percent: u8,
    source: ReferralFeeSource,
    has_referral: bool,
) -> Result<FeeBreakdown> {
    validate_split(protocol_percent, partner_percent, referral_percent, source)?;
    let protocol_gross = percent_of(total, protocol_percent)?;
    let partner = percent_of(total, partner_percent)?;
    let referral = if has_referral {
        percent_of(total, referral_percent)?
    } else {
        0
    };
    let (protocol, lp_deduction) = match source {
        ReferralFeeSource::Protocol => (protocol_gross - referral, protocol_gross + partner),
        ReferralFeeSource::LiquidityProvider => {
            (protocol_gross, protocol_gross + partner + referral)
        }
    };
    let lp = total
        .checked_sub(lp_deduction)
        .ok_or(AmmError::Underflow("fee shares exceed total"))?;
    Ok(FeeBreakdown {
        lp,
        protocol,
        partner,
        referral,
    })
}
