//! Bounty entity and its transition guards
//!
//! The guard methods here are the whole state machine: each one either
//! proves a transition is legal for the bounty's current status or returns
//! the typed error the caller surfaces. The ledger never mutates a bounty a
//! guard has rejected.

use chrono::{DateTime, Utc};
use relief_core::{AccountId, Amount, BountyId, LedgerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle status of a bounty
///
/// `Open` is initial, `Completed` is terminal. A rejected proof returns the
/// bounty to `Open`; nothing ever leaves `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BountyStatus {
    /// Accepting donations; organizer may submit proof at any time
    Open,
    /// Proof submitted, awaiting verification; donations are closed
    ProofPending,
    /// Proof accepted and funds settled to the organizer
    Completed,
}

impl fmt::Display for BountyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BountyStatus::Open => write!(f, "Open"),
            BountyStatus::ProofPending => write!(f, "ProofPending"),
            BountyStatus::Completed => write!(f, "Completed"),
        }
    }
}

/// Opaque reference to externally stored proof-of-relief evidence
///
/// The ledger stores and compares the reference, never interprets it; the
/// content-addressed store behind it is an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProofRef(String);

impl ProofRef {
    /// Create a proof reference; empty references are rejected
    pub fn new(reference: impl Into<String>) -> Result<Self> {
        let reference = reference.into();
        if reference.trim().is_empty() {
            return Err(LedgerError::invalid_argument("proof reference is empty"));
        }
        Ok(Self(reference))
    }

    /// The raw reference string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProofRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Descriptive fields attached to a bounty
///
/// Display-only: none of these participate in any invariant or guard after
/// creation. Required fields must be non-empty when the bounty is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountyMetadata {
    /// Short headline for the relief effort
    pub title: String,
    /// What the funds are for
    pub description: String,
    /// Where the relief work happens
    pub location: String,
    /// Display name of the organizer
    pub organizer_name: String,
    /// Optional content reference for a cover image
    pub image_ref: Option<String>,
}

impl BountyMetadata {
    /// Check that all required fields are present
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("title", &self.title),
            ("description", &self.description),
            ("location", &self.location),
            ("organizer_name", &self.organizer_name),
        ] {
            if value.trim().is_empty() {
                return Err(LedgerError::invalid_argument(format!("{field} is empty")));
            }
        }
        Ok(())
    }
}

/// A funding campaign tied to one organizer and one relief claim
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    /// Unique id, allocated at creation, never reused
    pub id: BountyId,
    /// Creator of the bounty; sole proof submitter and sole fund recipient
    pub organizer: AccountId,
    /// Descriptive fields
    pub meta: BountyMetadata,
    /// Funding target, fixed at creation. Advisory: donations past the goal
    /// are accepted, and proof may be submitted before the goal is met.
    pub goal: Amount,
    /// Running total of accepted donations; mutated only by `record_donation`
    pub raised: Amount,
    /// Lifecycle status
    pub status: BountyStatus,
    /// Evidence reference; `Some` while `ProofPending`, retained as an audit
    /// record after an accepted release, cleared on rejection
    pub proof: Option<ProofRef>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Refreshed on every accepted mutation
    pub updated_at: DateTime<Utc>,
}

impl Bounty {
    /// Construct a freshly created bounty in `Open` status
    pub fn new(
        id: BountyId,
        organizer: AccountId,
        meta: BountyMetadata,
        goal: Amount,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            organizer,
            meta,
            goal,
            raised: Amount::ZERO,
            status: BountyStatus::Open,
            proof: None,
            created_at: at,
            updated_at: at,
        }
    }

    /// Guard: donations are accepted only while `Open`
    ///
    /// The window closes during `ProofPending` so no value arrives that is
    /// ambiguous about whether it counts toward the claim under review.
    pub fn guard_donate(&self) -> Result<()> {
        match self.status {
            BountyStatus::Open => Ok(()),
            status => Err(LedgerError::invalid_state(
                self.id,
                format!("cannot donate while {status}"),
            )),
        }
    }

    /// Guard: only the organizer may submit proof, and only while `Open`
    pub fn guard_submit_proof(&self, caller: AccountId) -> Result<()> {
        if caller != self.organizer {
            return Err(LedgerError::unauthorized(format!(
                "only the organizer may submit proof for {}",
                self.id
            )));
        }
        match self.status {
            BountyStatus::Open => Ok(()),
            status => Err(LedgerError::invalid_state(
                self.id,
                format!("cannot submit proof while {status}"),
            )),
        }
    }

    /// Guard: release requires a pending proof
    ///
    /// A settled bounty reports `AlreadySettled` rather than `InvalidState`
    /// so callers can tell "already done by someone else" from "nothing
    /// happened".
    pub fn guard_release(&self) -> Result<()> {
        match self.status {
            BountyStatus::ProofPending => Ok(()),
            BountyStatus::Completed => Err(LedgerError::already_settled(self.id)),
            BountyStatus::Open => Err(LedgerError::invalid_state(
                self.id,
                "no proof pending".to_string(),
            )),
        }
    }

    /// Apply an accepted donation
    ///
    /// Caller has already passed `guard_donate`; the addition is checked so
    /// the accumulator can never wrap.
    pub fn record_donation(&mut self, amount: Amount, at: DateTime<Utc>) -> Result<()> {
        let raised = self.raised.checked_add(amount).ok_or_else(|| {
            LedgerError::invalid_argument(format!("donation overflows raised total for {}", self.id))
        })?;
        self.raised = raised;
        self.updated_at = at;
        Ok(())
    }

    /// Apply an accepted proof submission
    pub fn attach_proof(&mut self, proof: ProofRef, at: DateTime<Utc>) {
        self.proof = Some(proof);
        self.status = BountyStatus::ProofPending;
        self.updated_at = at;
    }

    /// Apply an accepted release; proof is retained as the audit record
    pub fn settle(&mut self, at: DateTime<Utc>) {
        self.status = BountyStatus::Completed;
        self.updated_at = at;
    }

    /// Apply a rejected release; proof is cleared, donations untouched
    pub fn reject_proof(&mut self, at: DateTime<Utc>) {
        self.proof = None;
        self.status = BountyStatus::Open;
        self.updated_at = at;
    }
}
