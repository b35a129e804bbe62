//! The two tokens traded by a pool.

use super::{Address, Token};
use crate::error::AmmError;

/// Which side of a pool a token sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TokenSide {
    /// Token A, whose price is quoted in token B.
    A,
    /// Token B, the quote token.
    B,
}

/// Direction of a trade through the pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TradeDirection {
    /// Sell token A for token B. Moves the price down.
    AToB,
    /// Sell token B for token A. Moves the price up.
    BToA,
}

impl TradeDirection {
    /// Side the trader pays in.
    #[must_use]
    pub const fn input_side(&self) -> TokenSide {
        match self {
            Self::AToB => TokenSide::A,
            Self::BToA => TokenSide::B,
        }
    }

    /// Side the trader receives.
    #[must_use]
    pub const fn output_side(&self) -> TokenSide {
        match self {
            Self::AToB => TokenSide::B,
            Self::BToA => TokenSide::A,
        }
    }
}

/// A pair of distinct tokens in pool order.
///
/// Unlike a sorted pair, the order is fixed by the pool creator: the price
/// is always the amount of B per unit of A.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{Address, Token, TokenPair, TradeDirection};
///
/// let a = Token::new(Address::from_bytes([1u8; 32]));
/// let b = Token::new(Address::from_bytes([2u8; 32]));
/// let pair = TokenPair::new(b, a).expect("distinct mints");
///
/// assert_eq!(pair.token_a(), b);
/// assert_eq!(pair.direction_for_input(&a.mint()), Ok(TradeDirection::BToA));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TokenPair {
    token_a: Token,
    token_b: Token,
}

impl TokenPair {
    /// Creates a pair.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if both tokens share a mint.
    pub fn new(token_a: Token, token_b: Token) -> Result<Self, AmmError> {
        if token_a.mint() == token_b.mint() {
            return Err(AmmError::InvalidToken("pool tokens must be distinct"));
        }
        Ok(Self { token_a, token_b })
    }

    /// Token A.
    #[must_use]
    pub const fn token_a(&self) -> Token {
        self.token_a
    }

    /// Token B.
    #[must_use]
    pub const fn token_b(&self) -> Token {
        self.token_b
    }

    /// Token on the given side.
    #[must_use]
    pub const fn token(&self, side: TokenSide) -> Token {
        match side {
            TokenSide::A => self.token_a,
            TokenSide::B => self.token_b,
        }
    }

    /// Trade direction implied by paying in `input_mint`.
    ///
    /// # Errors
    ///
    /// Returns [`AmmError::InvalidToken`] if the mint is not part of the pair.
    pub fn direction_for_input(&self, input_mint: &Address) -> Result<TradeDirection, AmmError> {
        if *input_mint == self.token_a.mint() {
            Ok(TradeDirection::AToB)
        } else if *input_mint == self.token_b.mint() {
            Ok(TradeDirection::BToA)
        } else {
            Err(AmmError::InvalidToken("mint is not traded by this pool"))
        }
    }
}
