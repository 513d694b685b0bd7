//! Deterministic replay of the event log
//!
//! Folding the ordered log from empty state reproduces the exact bounty and
//! donation data model. The live ledger's tables are a cache of the log;
//! this module is how external read models (and the ledger's own tests)
//! rebuild that cache.

use crate::bounty::Bounty;
use crate::donation::Donation;
use crate::event::{EventKind, EventRecord};
use relief_core::BountyId;
use std::collections::BTreeMap;
use tracing::warn;

/// State reconstructed from an event log
///
/// Donation histories are kept in append (sequence) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayState {
    /// All bounties, keyed by id
    pub bounties: BTreeMap<BountyId, Bounty>,
    /// Per-bounty donation history in append order
    pub donations: BTreeMap<BountyId, Vec<Donation>>,
}

impl ReplayState {
    /// Look up a replayed bounty
    pub fn bounty(&self, id: BountyId) -> Option<&Bounty> {
        self.bounties.get(&id)
    }

    /// Donation history for a replayed bounty, oldest first
    pub fn donations_for(&self, id: BountyId) -> &[Donation] {
        self.donations.get(&id).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Rebuild ledger state by folding an ordered event log
///
/// The input must be a log the ledger produced: events in sequence order,
/// every transition legal at its point in the fold. Entries that violate
/// that contract (unknown bounty, overflowing donation) indicate a corrupt
/// log; they are skipped with a warning rather than poisoning the rest of
/// the replay.
pub fn replay<I>(events: I) -> ReplayState
where
    I: IntoIterator<Item = EventRecord>,
{
    let mut state = ReplayState::default();

    for record in events {
        let id = record.bounty;
        match record.kind {
            EventKind::Created {
                organizer,
                goal,
                meta,
            } => {
                state
                    .bounties
                    .insert(id, Bounty::new(id, organizer, meta, goal, record.at));
                state.donations.entry(id).or_default();
            }
            EventKind::Donated { donor, amount } => {
                let Some(bounty) = state.bounties.get_mut(&id) else {
                    warn!(%id, seq = %record.seq, "Donated event for unknown bounty, skipping");
                    continue;
                };
                if bounty.record_donation(amount, record.at).is_err() {
                    warn!(%id, seq = %record.seq, "Donated event overflows raised total, skipping");
                    continue;
                }
                state.donations.entry(id).or_default().push(Donation {
                    bounty: id,
                    donor,
                    amount,
                    at: record.at,
                    seq: record.seq,
                });
            }
            EventKind::ProofSubmitted { proof } => {
                let Some(bounty) = state.bounties.get_mut(&id) else {
                    warn!(%id, seq = %record.seq, "ProofSubmitted event for unknown bounty, skipping");
                    continue;
                };
                bounty.attach_proof(proof, record.at);
            }
            EventKind::Released { verified, .. } => {
                let Some(bounty) = state.bounties.get_mut(&id) else {
                    warn!(%id, seq = %record.seq, "Released event for unknown bounty, skipping");
                    continue;
                };
                if verified {
                    bounty.settle(record.at);
                } else {
                    bounty.reject_proof(record.at);
                }
            }
        }
    }

    state
}
