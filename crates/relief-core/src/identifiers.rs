//! Identifier types used across the Relief Board platform
//!
//! Callers always address ledger entities by id, never by reference; the
//! ledger hands out snapshots, not aliases into its own state.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Bounty identifier
///
/// Opaque, monotonically allocated by the ledger at creation and immutable
/// thereafter. Ids are never reused, so a `BountyId` remains a valid lookup
/// key for the lifetime of the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BountyId(pub u64);

impl BountyId {
    /// Create from a raw index
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the inner index
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BountyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bounty-{}", self.0)
    }
}

impl From<u64> for BountyId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Account identifier for organizers, donors, and verifiers
///
/// Supplied by the external identity/signing layer, which is responsible for
/// authentication; the ledger treats the id as already authenticated and
/// never interprets it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AccountId(pub Uuid);

impl AccountId {
    /// Create a new random account ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from a UUID
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Get the inner UUID
    pub fn uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account-{}", self.0)
    }
}

impl From<Uuid> for AccountId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl From<AccountId> for Uuid {
    fn from(account_id: AccountId) -> Self {
        account_id.0
    }
}

/// Position of an event in the ledger's append-only log
///
/// Strictly increasing across the whole ledger, never reassigned. The
/// sequence is the replay order: folding events in `EventSeq` order from an
/// empty state reproduces current ledger state exactly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EventSeq(pub u64);

impl EventSeq {
    /// Sequence position of the first event in a log
    pub const FIRST: EventSeq = EventSeq(0);

    /// Create from a raw position
    pub fn new(seq: u64) -> Self {
        Self(seq)
    }

    /// Get the inner position
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The position following this one
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for EventSeq {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seq-{}", self.0)
    }
}
