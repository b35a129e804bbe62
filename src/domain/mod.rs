//! Value types shared by the math, fee and state layers.
//!
//! Amounts, liquidity, token identities, clock readings and swap requests
//! are all newtypes or small enums so that a token amount can never be
//! passed where liquidity is expected.

mod activation;
mod address;
mod amount;
mod basis_points;
mod liquidity;
mod rounding;
mod swap_result;
mod swap_spec;
mod token;
mod token_pair;

pub use activation::{ActivationType, Clock};
pub use address::Address;
pub use amount::Amount;
pub use basis_points::BasisPoints;
pub use liquidity::Liquidity;
pub use rounding::Rounding;
pub use swap_result::SwapResult;
pub use swap_spec::{SwapMode, SwapSpec};
pub use token::Token;
pub use token_pair::{TokenPair, TokenSide, TradeDirection};
