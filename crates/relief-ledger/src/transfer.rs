//! Fund transfer seam
//!
//! Moving value out of escrow is the one effect the ledger cannot perform
//! itself; it goes through this trait. Settlement only commits when the
//! backend confirms the transfer, so a failing backend can never leave a
//! bounty half-settled.

use parking_lot::Mutex;
use relief_core::{AccountId, Amount};
use std::collections::BTreeMap;

/// Errors a transfer backend may report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    /// The recipient cannot receive funds
    #[error("Recipient rejected transfer: {reason}")]
    Rejected {
        /// Backend-supplied reason
        reason: String,
    },

    /// The backend itself is unavailable
    #[error("Transfer backend unavailable: {reason}")]
    Unavailable {
        /// Backend-supplied reason
        reason: String,
    },
}

/// Confirmation of a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferReceipt {
    /// Recipient of the funds
    pub to: AccountId,
    /// Amount moved
    pub amount: Amount,
}

/// External fund movement used by settlement
pub trait FundTransfer: Send + Sync {
    /// Move `amount` from escrow to `to`; returns a receipt once confirmed
    fn transfer(&self, to: AccountId, amount: Amount)
        -> std::result::Result<TransferReceipt, TransferError>;
}

/// In-process transfer backend tracking per-account balances
///
/// Reference implementation and test double; a production host supplies its
/// own backend over the real value rail.
#[derive(Debug, Default)]
pub struct InMemoryVault {
    balances: Mutex<BTreeMap<AccountId, Amount>>,
}

impl InMemoryVault {
    /// Create an empty vault
    pub fn new() -> Self {
        Self::default()
    }

    /// Current balance credited to an account
    pub fn balance(&self, account: AccountId) -> Amount {
        self.balances
            .lock()
            .get(&account)
            .copied()
            .unwrap_or(Amount::ZERO)
    }
}

impl FundTransfer for InMemoryVault {
    fn transfer(
        &self,
        to: AccountId,
        amount: Amount,
    ) -> std::result::Result<TransferReceipt, TransferError> {
        let mut balances = self.balances.lock();
        let current = balances.get(&to).copied().unwrap_or(Amount::ZERO);
        let credited = current.checked_add(amount).ok_or(TransferError::Rejected {
            reason: "recipient balance overflow".to_string(),
        })?;
        balances.insert(to, credited);
        Ok(TransferReceipt { to, amount })
    }
}

/// Transfer backend that refuses every transfer
///
/// Exists to exercise the settlement rollback path.
#[derive(Debug, Clone)]
pub struct FailingVault {
    reason: String,
}

impl FailingVault {
    /// Create a backend that fails with the given reason
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl FundTransfer for FailingVault {
    fn transfer(
        &self,
        _to: AccountId,
        _amount: Amount,
    ) -> std::result::Result<TransferReceipt, TransferError> {
        Err(TransferError::Unavailable {
            reason: self.reason.clone(),
        })
    }
}
