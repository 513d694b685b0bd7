//! Escrow ledger for the Relief Board
//!
//! Donors fund disaster-relief bounties; funds release to the organizer only
//! after an accepted proof-of-relief. This crate is the trust boundary of
//! the platform: the bounty state machine, per-donor fund accounting, and
//! the append-only event log that external read models replay.
//!
//! # Architecture
//!
//! - **State machine**: a bounty moves `Open` → `ProofPending` → `Completed`,
//!   with rejection returning it to `Open`. Guard failures are atomic no-ops
//!   with typed errors.
//! - **Accounting**: `raised` always equals the sum of accepted donations;
//!   settlement is exactly-once and rolls back when the external transfer
//!   cannot be confirmed.
//! - **Event log**: every accepted transition appends one immutable event;
//!   replaying the ordered log from empty reproduces current state. The log
//!   is the system of record — in-memory tables are a cache of it.
//!
//! Read-only observers subscribe to the log (push) or poll `events_since`;
//! they never mutate ledger state.

pub mod bounty;
pub mod donation;
pub mod event;
pub mod ledger;
pub mod log;
pub mod replay;
pub mod transfer;

// Re-exports
pub use bounty::{Bounty, BountyMetadata, BountyStatus, ProofRef};
pub use donation::{Donation, DonationStats};
pub use event::{EventKind, EventRecord};
pub use ledger::{EscrowLedger, Settlement};
pub use log::EventLog;
pub use replay::{replay, ReplayState};
pub use transfer::{FailingVault, FundTransfer, InMemoryVault, TransferError, TransferReceipt};

// Core type re-exports
pub use relief_core::{
    AccountId, Amount, BountyId, Clock, EventSeq, LedgerConfig, LedgerError, Result,
    VerifierPolicy,
};
