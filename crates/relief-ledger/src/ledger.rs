//! The escrow ledger
//!
//! All state-mutating operations run under a single effective writer per
//! bounty: the registry resolves an id to its slot under a read lock, then
//! every check and mutation for that bounty happens inside the slot's own
//! mutex. Operations on different bounties never contend. The event log's
//! lock is always innermost, so log order agrees with mutation order.

use crate::bounty::{Bounty, BountyMetadata, ProofRef};
use crate::donation::{Donation, DonationStats};
use crate::event::{EventKind, EventRecord};
use crate::log::EventLog;
use crate::transfer::{FundTransfer, TransferReceipt};
use parking_lot::{Mutex, RwLock};
use relief_core::{
    AccountId, Amount, BountyId, Clock, EventSeq, LedgerConfig, LedgerError, Result, SystemClock,
};
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Outcome of a release decision
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    /// Proof accepted; the full raised amount moved to the organizer
    Accepted {
        /// Confirmation from the transfer backend
        receipt: TransferReceipt,
    },
    /// Proof rejected; no funds moved, the bounty reopened
    Rejected,
}

/// Per-bounty state guarded by one mutex
///
/// The donation history lives behind the same lock as the bounty so the
/// `raised == sum(donations)` invariant holds at every observable point.
struct BountySlot {
    bounty: Bounty,
    donations: Vec<Donation>,
}

/// The authoritative escrow ledger
///
/// Owns the bounty registry, the donation accounting, and the append-only
/// event log. External read models observe the log; they never mutate state.
pub struct EscrowLedger {
    config: LedgerConfig,
    clock: Arc<dyn Clock>,
    vault: Arc<dyn FundTransfer>,
    log: EventLog,
    next_id: AtomicU64,
    bounties: RwLock<BTreeMap<BountyId, Arc<Mutex<BountySlot>>>>,
}

impl EscrowLedger {
    /// Create a ledger with default configuration and the system clock
    pub fn new(vault: Arc<dyn FundTransfer>) -> Self {
        Self::with_config(LedgerConfig::default(), Arc::new(SystemClock), vault)
    }

    /// Create a ledger with explicit configuration and clock
    pub fn with_config(
        config: LedgerConfig,
        clock: Arc<dyn Clock>,
        vault: Arc<dyn FundTransfer>,
    ) -> Self {
        let log = EventLog::new(config.event_channel_capacity);
        Self {
            config,
            clock,
            vault,
            log,
            next_id: AtomicU64::new(1),
            bounties: RwLock::new(BTreeMap::new()),
        }
    }

    /// The active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn slot(&self, id: BountyId) -> Result<Arc<Mutex<BountySlot>>> {
        self.bounties
            .read()
            .get(&id)
            .cloned()
            .ok_or_else(|| LedgerError::not_found(id))
    }

    // ---- State-mutating operations -------------------------------------

    /// Create a bounty; the caller becomes its organizer
    ///
    /// The goal must be positive and all required metadata fields non-empty.
    /// Returns the freshly allocated id.
    pub fn create_bounty(
        &self,
        organizer: AccountId,
        meta: BountyMetadata,
        goal: Amount,
    ) -> Result<BountyId> {
        if goal.is_zero() {
            return Err(LedgerError::invalid_argument("goal must be positive"));
        }
        meta.validate()?;

        let now = self.clock.now();
        let mut bounties = self.bounties.write();
        let id = BountyId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let slot = Arc::new(Mutex::new(BountySlot {
            bounty: Bounty::new(id, organizer, meta.clone(), goal, now),
            donations: Vec::new(),
        }));
        // Hold the slot across publication so no donation can slip in ahead
        // of the Created event.
        let guard = slot.lock();
        bounties.insert(id, Arc::clone(&slot));
        drop(bounties);
        self.log.append(now, id, EventKind::Created { organizer, goal, meta });
        drop(guard);

        debug!(%id, organizer = %organizer, %goal, "bounty created");
        Ok(id)
    }

    /// Accept a donation to an `Open` bounty
    ///
    /// The amount must be strictly positive. Returns the sequence of the
    /// `Donated` event, which doubles as the donation's audit reference.
    pub fn donate(&self, donor: AccountId, id: BountyId, amount: Amount) -> Result<EventSeq> {
        if amount.is_zero() {
            return Err(LedgerError::invalid_argument(
                "donation amount must be positive",
            ));
        }
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        guard.bounty.guard_donate()?;

        let now = self.clock.now();
        guard.bounty.record_donation(amount, now)?;
        let record = self.log.append(now, id, EventKind::Donated { donor, amount });
        guard.donations.push(Donation {
            bounty: id,
            donor,
            amount,
            at: now,
            seq: record.seq,
        });

        debug!(%id, donor = %donor, %amount, raised = %guard.bounty.raised, "donation accepted");
        Ok(record.seq)
    }

    /// Submit proof of relief; caller must be the organizer
    ///
    /// Permitted any time while `Open`, including below goal: relief work may
    /// legitimately start before full funding, so the goal is advisory here.
    pub fn submit_proof(&self, caller: AccountId, id: BountyId, proof: ProofRef) -> Result<()> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        guard.bounty.guard_submit_proof(caller)?;

        let now = self.clock.now();
        guard.bounty.attach_proof(proof.clone(), now);
        self.log.append(now, id, EventKind::ProofSubmitted { proof });

        debug!(%id, "proof submitted, awaiting verification");
        Ok(())
    }

    /// Decide a pending proof
    ///
    /// Accepting moves the entire raised amount to the organizer exactly
    /// once; the status only advances once the transfer backend confirms.
    /// Rejecting clears the proof and reopens the bounty with donations
    /// untouched.
    pub fn release(&self, caller: AccountId, id: BountyId, verified: bool) -> Result<Settlement> {
        let slot = self.slot(id)?;
        let mut guard = slot.lock();
        guard.bounty.guard_release()?;

        let organizer = guard.bounty.organizer;
        if !self.config.verifier.authorizes(caller, organizer) {
            return Err(LedgerError::unauthorized(format!(
                "{caller} holds no verifier authority for {id}"
            )));
        }

        let now = self.clock.now();
        if verified {
            let amount = guard.bounty.raised;
            let receipt = self.vault.transfer(organizer, amount).map_err(|err| {
                warn!(%id, %err, "settlement transfer failed, bounty stays ProofPending");
                LedgerError::transfer_failed(err.to_string())
            })?;
            guard.bounty.settle(now);
            self.log.append(
                now,
                id,
                EventKind::Released {
                    verified: true,
                    amount,
                    to: organizer,
                },
            );
            info!(%id, %amount, to = %organizer, "bounty settled");
            Ok(Settlement::Accepted { receipt })
        } else {
            guard.bounty.reject_proof(now);
            self.log.append(
                now,
                id,
                EventKind::Released {
                    verified: false,
                    amount: Amount::ZERO,
                    to: organizer,
                },
            );
            debug!(%id, "proof rejected, bounty reopened");
            Ok(Settlement::Rejected)
        }
    }

    // ---- Read operations -----------------------------------------------

    /// Snapshot of one bounty
    pub fn bounty(&self, id: BountyId) -> Result<Bounty> {
        Ok(self.slot(id)?.lock().bounty.clone())
    }

    /// Snapshots of all bounties, in stable id order
    pub fn all_bounties(&self) -> Vec<Bounty> {
        let bounties = self.bounties.read();
        bounties
            .values()
            .map(|slot| slot.lock().bounty.clone())
            .collect()
    }

    /// Donation history for one bounty, newest first
    pub fn donations(&self, id: BountyId) -> Result<Vec<Donation>> {
        let slot = self.slot(id)?;
        let guard = slot.lock();
        let mut donations = guard.donations.clone();
        donations.reverse();
        Ok(donations)
    }

    /// Donation history across all bounties, newest first
    pub fn all_donations(&self) -> Vec<Donation> {
        let bounties = self.bounties.read();
        let mut donations: Vec<Donation> = bounties
            .values()
            .flat_map(|slot| slot.lock().donations.clone())
            .collect();
        donations.sort_by(|a, b| b.seq.cmp(&a.seq));
        donations
    }

    /// Aggregate donation figures for one bounty
    pub fn donation_stats(&self, id: BountyId) -> Result<DonationStats> {
        let slot = self.slot(id)?;
        let guard = slot.lock();
        Ok(DonationStats::from_donations(&guard.donations))
    }

    /// All events at or after `seq`, in order (poll path for read models)
    pub fn events_since(&self, seq: EventSeq) -> Vec<EventRecord> {
        self.log.events_since(seq)
    }

    /// The full ordered event log
    pub fn events(&self) -> Vec<EventRecord> {
        self.log.all()
    }

    /// Subscribe to events appended after this call (push path)
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.log.subscribe()
    }
}

impl std::fmt::Debug for EscrowLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EscrowLedger")
            .field("bounties", &self.bounties.read().len())
            .field("events", &self.log.len())
            .finish()
    }
}
