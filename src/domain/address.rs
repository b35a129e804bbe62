//! Opaque 32-byte account identity.

use core::fmt;

/// Identity of a mint, an owner or a reward funder on the ledger.
///
/// The engine never interprets the bytes; it only compares them.
///
/// # Examples
///
/// ```
/// use rangepool::domain::Address;
///
/// let owner = Address::from_bytes([7u8; 32]);
/// assert_ne!(owner, Address::default());
/// assert_eq!(owner.as_bytes()[0], 7);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address([u8; 32]);

impl Address {
    /// Wraps raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Borrows the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns `true` for the all-zero address, which marks an unset slot.
    #[must_use]
    pub fn is_default(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for Address {
    /// Shows the first four bytes in hex, enough to tell accounts apart in logs.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in self.0.iter().take(4) {
            write!(f, "{byte:02x}")?;
        }
        write!(f, "..")
    }
}
