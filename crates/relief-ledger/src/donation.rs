//! Donation records and per-bounty donation statistics

use chrono::{DateTime, Utc};
use relief_core::{AccountId, Amount, BountyId, EventSeq};
use serde::{Deserialize, Serialize};

/// An accepted donation
///
/// Immutable once recorded: donations are never edited or deleted, and a
/// bounty's `raised` total always equals the sum of its donation amounts.
/// `seq` is the position of the `Donated` event that produced the record,
/// which ties every donation back to the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    /// The funded bounty
    pub bounty: BountyId,
    /// Identity of the donor
    pub donor: AccountId,
    /// Donated amount, strictly positive
    pub amount: Amount,
    /// When the donation was accepted
    pub at: DateTime<Utc>,
    /// Sequence of the ledger event that recorded this donation
    pub seq: EventSeq,
}

/// Aggregate figures over one bounty's donations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DonationStats {
    /// Number of accepted donations
    pub count: usize,
    /// Sum of all donation amounts
    pub total: Amount,
    /// Number of distinct donor accounts
    pub unique_donors: usize,
    /// Mean donation in base units, zero when there are none
    pub average: Amount,
}

impl DonationStats {
    /// Compute statistics over a bounty's donation history
    pub fn from_donations(donations: &[Donation]) -> Self {
        let count = donations.len();
        let total: Amount = donations.iter().map(|d| d.amount).sum();
        let unique_donors = donations
            .iter()
            .map(|d| d.donor)
            .collect::<std::collections::BTreeSet<_>>()
            .len();
        let average = if count == 0 {
            Amount::ZERO
        } else {
            Amount::new(total.value() / count as u64)
        };
        Self {
            count,
            total,
            unique_donors,
            average,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn stats_over_empty_history_are_zero() {
        let stats = DonationStats::from_donations(&[]);
        assert_eq!(stats.count, 0);
        assert_eq!(stats.total, Amount::ZERO);
        assert_eq!(stats.average, Amount::ZERO);
    }

    #[test]
    fn stats_count_unique_donors() {
        let at = Utc.timestamp_opt(1_700_000_000, 0).single().unwrap();
        let repeat = AccountId::new();
        let donations = vec![
            Donation {
                bounty: BountyId::new(1),
                donor: repeat,
                amount: Amount::new(40),
                at,
                seq: EventSeq::new(1),
            },
            Donation {
                bounty: BountyId::new(1),
                donor: repeat,
                amount: Amount::new(30),
                at,
                seq: EventSeq::new(2),
            },
            Donation {
                bounty: BountyId::new(1),
                donor: AccountId::new(),
                amount: Amount::new(20),
                at,
                seq: EventSeq::new(3),
            },
        ];
        let stats = DonationStats::from_donations(&donations);
        assert_eq!(stats.count, 3);
        assert_eq!(stats.total, Amount::new(90));
        assert_eq!(stats.unique_donors, 2);
        assert_eq!(stats.average, Amount::new(30));
    }
}
