//! Unified error type for ledger operations
//!
//! Every state-mutating operation either fully applies or fails with one of
//! these kinds and leaves state untouched. Errors surface synchronously to
//! the caller; the ledger performs no silent recovery and no implicit retry.

use crate::identifiers::BountyId;
use serde::{Deserialize, Serialize};

/// Error type for all ledger operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum LedgerError {
    /// Referenced bounty id does not exist
    #[error("Bounty not found: {id}")]
    NotFound {
        /// The id that failed to resolve
        id: BountyId,
    },

    /// Operation guard failed for the bounty's current status
    #[error("Invalid state for {id}: {message}")]
    InvalidState {
        /// The bounty the operation addressed
        id: BountyId,
        /// What the guard rejected
        message: String,
    },

    /// Caller lacks the required role
    #[error("Unauthorized: {message}")]
    Unauthorized {
        /// Which role check failed
        message: String,
    },

    /// Malformed input: non-positive amount or goal, empty required field
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Which argument was rejected
        message: String,
    },

    /// Release attempted on a bounty that already settled
    ///
    /// Distinct from `InvalidState` so callers can tell "already done by
    /// someone else" apart from "nothing happened".
    #[error("Already settled: {id}")]
    AlreadySettled {
        /// The settled bounty
        id: BountyId,
    },

    /// External fund movement could not be confirmed during release
    #[error("Transfer failed: {message}")]
    TransferFailed {
        /// Reason reported by the transfer backend
        message: String,
    },
}

impl LedgerError {
    /// Create a not-found error
    pub fn not_found(id: BountyId) -> Self {
        Self::NotFound { id }
    }

    /// Create an invalid-state error
    pub fn invalid_state(id: BountyId, message: impl Into<String>) -> Self {
        Self::InvalidState {
            id,
            message: message.into(),
        }
    }

    /// Create an unauthorized error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    /// Create an invalid-argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create an already-settled error
    pub fn already_settled(id: BountyId) -> Self {
        Self::AlreadySettled { id }
    }

    /// Create a transfer-failed error
    pub fn transfer_failed(message: impl Into<String>) -> Self {
        Self::TransferFailed {
            message: message.into(),
        }
    }
}

/// Standard Result type for ledger operations
pub type Result<T> = std::result::Result<T, LedgerError>;
