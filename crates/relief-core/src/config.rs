//! Ledger configuration
//!
//! Covers the two knobs the ledger exposes: who may verify proofs, and how
//! large the event broadcast buffer is. Loadable from TOML for hosts that
//! configure the ledger from a file.

use crate::identifiers::AccountId;
use serde::{Deserialize, Serialize};

/// Who holds verifier authority over proof submissions
///
/// The observed contract lets the organizer self-attest their own proof,
/// which is a trust weakness rather than deliberate security policy. Hosts
/// that want a disinterested reviewer designate one here; the organizer is
/// then rejected as a release caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VerifierPolicy {
    /// The organizer accepts or rejects their own proof
    OrganizerSelfAttest,
    /// A single designated account reviews proofs; the organizer may not
    Designated {
        /// The reviewing account
        verifier: AccountId,
    },
}

impl VerifierPolicy {
    /// Whether `caller` may decide a release for a bounty owned by `organizer`
    pub fn authorizes(&self, caller: AccountId, organizer: AccountId) -> bool {
        match self {
            VerifierPolicy::OrganizerSelfAttest => caller == organizer,
            VerifierPolicy::Designated { verifier } => caller == *verifier,
        }
    }
}

impl Default for VerifierPolicy {
    fn default() -> Self {
        VerifierPolicy::OrganizerSelfAttest
    }
}

/// Ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    /// Verifier authority policy
    pub verifier: VerifierPolicy,

    /// Capacity of the event broadcast channel handed to subscribers
    ///
    /// Lagging subscribers lose the oldest buffered events rather than
    /// blocking the writer; they recover via `events_since`.
    pub event_channel_capacity: usize,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            verifier: VerifierPolicy::default(),
            event_channel_capacity: 256,
        }
    }
}

impl LedgerConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }
}
