//! Ledger events
//!
//! Every accepted state transition appends exactly one event. Events are
//! immutable, totally ordered by sequence, and carry enough payload that
//! replaying the log from empty reproduces the full bounty/donation data
//! model. The serialized form is the wire contract read models consume.

use crate::bounty::{BountyMetadata, ProofRef};
use chrono::{DateTime, Utc};
use relief_core::{AccountId, Amount, BountyId, EventSeq};
use serde::{Deserialize, Serialize};

/// Payload of a ledger event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A bounty was created
    Created {
        /// Identity that created the bounty and will receive its funds
        organizer: AccountId,
        /// Funding target
        goal: Amount,
        /// Display fields captured at creation
        meta: BountyMetadata,
    },
    /// A donation was accepted
    Donated {
        /// Identity of the donor
        donor: AccountId,
        /// Donated amount
        amount: Amount,
    },
    /// The organizer submitted proof of relief
    ProofSubmitted {
        /// Content reference of the evidence
        proof: ProofRef,
    },
    /// A verifier decided a pending proof
    Released {
        /// Whether the proof was accepted
        verified: bool,
        /// Amount settled to the organizer; zero on rejection
        amount: Amount,
        /// Recipient of the settlement
        to: AccountId,
    },
}

impl EventKind {
    /// Short name of the event kind, for logs and metrics
    pub fn name(&self) -> &'static str {
        match self {
            EventKind::Created { .. } => "Created",
            EventKind::Donated { .. } => "Donated",
            EventKind::ProofSubmitted { .. } => "ProofSubmitted",
            EventKind::Released { .. } => "Released",
        }
    }
}

/// One entry of the append-only audit log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Strictly increasing position across the whole ledger
    pub seq: EventSeq,
    /// Wall-clock time the transition was accepted
    pub at: DateTime<Utc>,
    /// The bounty the transition addressed
    pub bounty: BountyId,
    /// Transition payload
    pub kind: EventKind,
}

impl EventRecord {
    /// Serialize to the JSON wire form consumed by external read models
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Parse an event from its JSON wire form
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}
