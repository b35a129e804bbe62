//! Clock readings and the point a pool measures time with.

/// Unit in which a pool measures activation and vesting points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActivationType {
    /// Ledger slot numbers.
    #[default]
    Slot,
    /// Unix timestamps in seconds.
    Timestamp,
}

/// A reading of the ledger clock supplied by the runtime with each call.
///
/// Both fields are monotonically non-decreasing across calls.
///
/// # Examples
///
/// ```
/// use rangepool::domain::{ActivationType, Clock};
///
/// let clock = Clock::new(120, 1_700_000_000);
/// assert_eq!(clock.current_point(ActivationType::Slot), 120);
/// assert_eq!(clock.current_point(ActivationType::Timestamp), 1_700_000_000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Clock {
    /// Current slot.
    pub slot: u64,
    /// Current unix timestamp in seconds.
    pub unix_timestamp: u64,
}

impl Clock {
    /// Creates a clock reading.
    #[must_use]
    pub const fn new(slot: u64, unix_timestamp: u64) -> Self {
        Self {
            slot,
            unix_timestamp,
        }
    }

    /// The point relevant for `activation_type`.
    #[must_use]
    pub const fn current_point(&self, activation_type: ActivationType) -> u64 {
        match activation_type {
            ActivationType::Slot => self.slot,
            ActivationType::Timestamp => self.unix_timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_activation_is_slot() {
        assert_eq!(ActivationType::default(), ActivationType::Slot);
    }

    #[test]
    fn point_selection() {
        let clock = Clock::new(5, 10);
        assert_eq!(clock.current_point(ActivationType::Slot), 5);
        assert_eq!(clock.current_point(ActivationType::Timestamp), 10);
    }
}
