//! End-to-end lifecycle tests for the escrow ledger
//!
//! Covers the full funding → proof → settlement path, every guard rejection,
//! the rejection/reopen path, and settlement rollback when the transfer
//! backend fails.

use assert_matches::assert_matches;
use relief_ledger::{
    AccountId, Amount, BountyMetadata, BountyStatus, EscrowLedger, FailingVault, InMemoryVault,
    LedgerConfig, LedgerError, ProofRef, Settlement, VerifierPolicy,
};
use relief_core::ManualClock;
use std::sync::Arc;

// ========== Test Utilities ==========

fn meta() -> BountyMetadata {
    BountyMetadata {
        title: "Flood relief".to_string(),
        description: "Sandbags, pumps, and shelter kits".to_string(),
        location: "Riverside district".to_string(),
        organizer_name: "Riverside Relief Org".to_string(),
        image_ref: Some("QmCoverImage".to_string()),
    }
}

fn proof() -> ProofRef {
    ProofRef::new("QmProofOfRelief").unwrap()
}

fn ledger_with_vault() -> (EscrowLedger, Arc<InMemoryVault>, ManualClock) {
    // One subscriber per process; later calls are no-ops.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
    let clock = ManualClock::default();
    let vault = Arc::new(InMemoryVault::new());
    let ledger = EscrowLedger::with_config(
        LedgerConfig::default(),
        Arc::new(clock.clone()),
        vault.clone(),
    );
    (ledger, vault, clock)
}

// ========== Settlement Path ==========

#[test]
fn over_funded_lifecycle_settles_exactly_once() {
    let (ledger, vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();
    let donor = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(donor, id, Amount::new(40)).unwrap();
    // Over-funding is legal; the goal is advisory.
    ledger.donate(donor, id, Amount::new(70)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    let settlement = ledger.release(organizer, id, true).unwrap();
    assert_matches!(settlement, Settlement::Accepted { receipt } => {
        assert_eq!(receipt.to, organizer);
        assert_eq!(receipt.amount, Amount::new(110));
    });
    assert_eq!(vault.balance(organizer), Amount::new(110));

    let settled = ledger.bounty(id).unwrap();
    assert_eq!(settled.status, BountyStatus::Completed);
    assert_eq!(settled.raised, Amount::new(110));
    // Accepted proof stays on the bounty as the audit record.
    assert!(settled.proof.is_some());

    // Second release fails with the distinct already-settled kind and
    // changes nothing.
    let err = ledger.release(organizer, id, true).unwrap_err();
    assert_matches!(err, LedgerError::AlreadySettled { .. });
    assert_eq!(ledger.bounty(id).unwrap(), settled);
    assert_eq!(vault.balance(organizer), Amount::new(110));
}

#[test]
fn proof_may_be_submitted_below_goal() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(1_000)).unwrap();
    ledger.donate(AccountId::new(), id, Amount::new(5)).unwrap();
    // Relief work may start before full funding; the core must not block this.
    ledger.submit_proof(organizer, id, proof()).unwrap();
    assert_eq!(ledger.bounty(id).unwrap().status, BountyStatus::ProofPending);
}

#[test]
fn settlement_of_an_unfunded_bounty_moves_zero() {
    let (ledger, vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();
    let settlement = ledger.release(organizer, id, true).unwrap();
    assert_matches!(settlement, Settlement::Accepted { receipt } => {
        assert_eq!(receipt.amount, Amount::ZERO);
    });
    assert_eq!(vault.balance(organizer), Amount::ZERO);
    assert_eq!(ledger.bounty(id).unwrap().status, BountyStatus::Completed);
}

// ========== Rejection Path ==========

#[test]
fn rejected_proof_reopens_with_funds_intact() {
    let (ledger, vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();
    let donor = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(donor, id, Amount::new(60)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    let settlement = ledger.release(organizer, id, false).unwrap();
    assert_eq!(settlement, Settlement::Rejected);

    let bounty = ledger.bounty(id).unwrap();
    assert_eq!(bounty.status, BountyStatus::Open);
    assert!(bounty.proof.is_none());
    assert_eq!(bounty.raised, Amount::new(60));
    assert_eq!(vault.balance(organizer), Amount::ZERO);

    // The donation window reopens after rejection.
    ledger.donate(donor, id, Amount::new(10)).unwrap();
    assert_eq!(ledger.bounty(id).unwrap().raised, Amount::new(70));
}

// ========== Guard Failures ==========

#[test]
fn donations_are_closed_while_proof_pending() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(AccountId::new(), id, Amount::new(30)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    let events_before = ledger.events().len();
    let err = ledger.donate(AccountId::new(), id, Amount::new(5)).unwrap_err();
    assert_matches!(err, LedgerError::InvalidState { .. });
    assert_eq!(ledger.bounty(id).unwrap().raised, Amount::new(30));
    assert_eq!(ledger.events().len(), events_before);
}

#[test]
fn donations_are_closed_after_completion() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(AccountId::new(), id, Amount::new(30)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();
    ledger.release(organizer, id, true).unwrap();

    let err = ledger.donate(AccountId::new(), id, Amount::new(5)).unwrap_err();
    assert_matches!(err, LedgerError::InvalidState { .. });
    assert_eq!(ledger.bounty(id).unwrap().raised, Amount::new(30));
}

#[test]
fn zero_amount_donation_is_a_complete_no_op() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    let events_before = ledger.events().len();

    let err = ledger.donate(AccountId::new(), id, Amount::ZERO).unwrap_err();
    assert_matches!(err, LedgerError::InvalidArgument { .. });
    assert_eq!(ledger.bounty(id).unwrap().raised, Amount::ZERO);
    assert_eq!(ledger.events().len(), events_before);
    assert!(ledger.donations(id).unwrap().is_empty());
}

#[test]
fn non_organizer_cannot_submit_proof() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    let err = ledger.submit_proof(AccountId::new(), id, proof()).unwrap_err();
    assert_matches!(err, LedgerError::Unauthorized { .. });
    assert_eq!(ledger.bounty(id).unwrap().status, BountyStatus::Open);
}

#[test]
fn release_without_a_pending_proof_is_invalid_state() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    let err = ledger.release(organizer, id, true).unwrap_err();
    assert_matches!(err, LedgerError::InvalidState { .. });
}

#[test]
fn resubmitting_proof_while_pending_is_invalid_state() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();
    let err = ledger.submit_proof(organizer, id, proof()).unwrap_err();
    assert_matches!(err, LedgerError::InvalidState { .. });
}

#[test]
fn empty_required_metadata_rejects_creation() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let mut bad = meta();
    bad.title = "   ".to_string();
    let err = ledger.create_bounty(AccountId::new(), bad, Amount::new(50)).unwrap_err();
    assert_matches!(err, LedgerError::InvalidArgument { .. });
    assert!(ledger.all_bounties().is_empty());
}

// ========== Settlement Rollback ==========

#[test]
fn failed_transfer_rolls_back_the_release() {
    let clock = ManualClock::default();
    let ledger = EscrowLedger::with_config(
        LedgerConfig::default(),
        Arc::new(clock),
        Arc::new(FailingVault::new("backend offline")),
    );
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(AccountId::new(), id, Amount::new(80)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    let events_before = ledger.events().len();
    let err = ledger.release(organizer, id, true).unwrap_err();
    assert_matches!(err, LedgerError::TransferFailed { .. });

    // Status must not advance, the proof must survive, and no Released
    // event may exist.
    let bounty = ledger.bounty(id).unwrap();
    assert_eq!(bounty.status, BountyStatus::ProofPending);
    assert!(bounty.proof.is_some());
    assert_eq!(bounty.raised, Amount::new(80));
    assert_eq!(ledger.events().len(), events_before);

    // Rejection still works after a failed settlement attempt.
    let settlement = ledger.release(organizer, id, false).unwrap();
    assert_eq!(settlement, Settlement::Rejected);
    assert_eq!(ledger.bounty(id).unwrap().status, BountyStatus::Open);
}

// ========== Verifier Policy ==========

#[test]
fn self_attestation_rejects_other_callers() {
    let (ledger, _vault, _clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    let err = ledger.release(AccountId::new(), id, true).unwrap_err();
    assert_matches!(err, LedgerError::Unauthorized { .. });
    assert_eq!(ledger.bounty(id).unwrap().status, BountyStatus::ProofPending);
}

#[test]
fn designated_verifier_excludes_the_organizer() {
    let organizer = AccountId::new();
    let reviewer = AccountId::new();
    let clock = ManualClock::default();
    let vault = Arc::new(InMemoryVault::new());
    let config = LedgerConfig {
        verifier: VerifierPolicy::Designated { verifier: reviewer },
        ..LedgerConfig::default()
    };
    let ledger = EscrowLedger::with_config(config, Arc::new(clock), vault.clone());

    let id = ledger.create_bounty(organizer, meta(), Amount::new(50)).unwrap();
    ledger.donate(AccountId::new(), id, Amount::new(50)).unwrap();
    ledger.submit_proof(organizer, id, proof()).unwrap();

    // The organizer may no longer self-attest.
    let err = ledger.release(organizer, id, true).unwrap_err();
    assert_matches!(err, LedgerError::Unauthorized { .. });

    ledger.release(reviewer, id, true).unwrap();
    assert_eq!(vault.balance(organizer), Amount::new(50));
}

// ========== Read Surface ==========

#[test]
fn donation_histories_and_stats() {
    let (ledger, _vault, clock) = ledger_with_vault();
    let organizer = AccountId::new();
    let alice = AccountId::new();
    let bob = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    ledger.donate(alice, id, Amount::new(40)).unwrap();
    clock.advance_secs(10);
    ledger.donate(bob, id, Amount::new(30)).unwrap();
    clock.advance_secs(10);
    ledger.donate(alice, id, Amount::new(20)).unwrap();

    // History is newest first.
    let history = ledger.donations(id).unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].amount, Amount::new(20));
    assert_eq!(history[2].amount, Amount::new(40));
    assert!(history[0].at > history[2].at);

    let stats = ledger.donation_stats(id).unwrap();
    assert_eq!(stats.count, 3);
    assert_eq!(stats.total, Amount::new(90));
    assert_eq!(stats.unique_donors, 2);
    assert_eq!(stats.average, Amount::new(30));

    let all = ledger.all_donations();
    assert_eq!(all.len(), 3);
    assert!(all[0].seq > all[2].seq);
}

#[test]
fn timestamps_track_mutations() {
    let (ledger, _vault, clock) = ledger_with_vault();
    let organizer = AccountId::new();

    let id = ledger.create_bounty(organizer, meta(), Amount::new(100)).unwrap();
    let created = ledger.bounty(id).unwrap();
    assert_eq!(created.created_at, created.updated_at);

    clock.advance_secs(60);
    ledger.donate(AccountId::new(), id, Amount::new(10)).unwrap();
    let updated = ledger.bounty(id).unwrap();
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > updated.created_at);
}
