//! Token identity as seen by a pool.

use super::{Address, Amount};
use crate::error::Result;
use crate::fee::TransferFee;

/// A pool-side token: its mint identity plus an optional transfer fee the
/// ledger withholds on every movement of the token.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{Address, Amount, BasisPoints, Token};
/// use rangepool::fee::TransferFee;
///
/// let plain = Token::new(Address::from_bytes([1u8; 32]));
/// assert_eq!(plain.amount_received(Amount::new(100)), Amount::new(100));
///
/// let fee = TransferFee::new(BasisPoints::new(100), Amount::new(1_000)).expect("valid fee");
/// let taxed = Token::with_transfer_fee(Address::from_bytes([2u8; 32]), fee);
/// assert_eq!(taxed.amount_received(Amount::new(100)), Amount::new(99));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Token {
    mint: Address,
    transfer_fee: Option<TransferFee>,
}

impl Token {
    /// A token without a transfer fee.
    #[must_use]
    pub const fn new(mint: Address) -> Self {
        Self {
            mint,
            transfer_fee: None,
        }
    }

    /// A token whose transfers are taxed by `transfer_fee`.
    #[must_use]
    pub const fn with_transfer_fee(mint: Address, transfer_fee: TransferFee) -> Self {
        Self {
            mint,
            transfer_fee: Some(transfer_fee),
        }
    }

    /// Mint identity.
    #[must_use]
    pub const fn mint(&self) -> Address {
        self.mint
    }

    /// Transfer fee, if the mint carries one.
    #[must_use]
    pub const fn transfer_fee(&self) -> Option<TransferFee> {
        self.transfer_fee
    }

    /// Amount that arrives at the destination when `sent` leaves the source.
    pub fn amount_received(&self, sent: Amount) -> Amount {
        match self.transfer_fee {
            Some(fee) => fee.excluded_amount(sent),
            None => sent,
        }
    }

    /// Amount that must leave the source so that `received` arrives.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::ArithmeticOverflow`](crate::error::AmmError::ArithmeticOverflow)
    /// if the grossed-up amount does not fit an [`Amount`].
    pub fn amount_to_send(&self, received: Amount) -> Result<Amount> {
        match self.transfer_fee {
            Some(fee) => fee.included_amount(received),
            None => Ok(received),
        }
    }
}
