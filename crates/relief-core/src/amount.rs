//! Amounts of value in the ledger's base unit
//!
//! All accounting is integer arithmetic in base units (the smallest
//! denomination of the escrowed asset). Conversion to display units is a
//! presentation concern and does not belong in the core.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;

/// A quantity of value in base units
///
/// Additions are checked: accumulators in the ledger refuse to overflow
/// rather than wrap.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Amount(pub u64);

impl Amount {
    /// The zero amount
    pub const ZERO: Amount = Amount(0);

    /// Create from base units
    pub fn new(units: u64) -> Self {
        Self(units)
    }

    /// Get the raw base-unit value
    pub fn value(&self) -> u64 {
        self.0
    }

    /// Whether this amount is zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checked addition; `None` on overflow
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Checked subtraction; `None` on underflow
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Amount {
    fn from(units: u64) -> Self {
        Self(units)
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Self {
        // Summation is only used over donation sets whose running total
        // already passed the checked accumulator, so saturation here is
        // unreachable in practice.
        iter.fold(Amount::ZERO, |acc, a| Amount(acc.0.saturating_add(a.0)))
    }
}
