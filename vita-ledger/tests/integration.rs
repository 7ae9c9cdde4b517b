//! Integration tests for vita-ledger.

use proptest::prelude::*;
use vita_attestation::{Attestation, AttestationError, AttestationRegistry};
use vita_common::{AdminChange, Address, Caller, ErrorKind, Role, YieldSplit, PRECISION};
use vita_ledger::{Collateral, IssuancePolicy, LedgerError, MintingLedger, DECIMALS};
use vita_staking::{SimulatedWrappedAsset, StakingPool};
use vita_test_fixtures::{
    attestation_with_nonce, fixtures, sample_attestation, small_attestation, ADMIN, FIXTURE_NOW,
    INVESTOR, LEDGER, WORKER,
};
use vita_valuation::ValuationEngine;

// === Test Fixtures ===

fn sample_ledger() -> MintingLedger {
    let f = fixtures();
    MintingLedger::new(
        LEDGER,
        AttestationRegistry::new(f.domain(), [f.oracle().address()]),
        ValuationEngine::default(),
        IssuancePolicy::default(),
        2000,
    )
}

fn worker() -> Caller {
    Caller::unprivileged(WORKER)
}

fn admin() -> Caller {
    Caller::new(ADMIN, [Role::Admin])
}

fn mint(ledger: &mut MintingLedger, attestation: &Attestation) -> Result<u128, LedgerError> {
    let signature = fixtures().sign(attestation).unwrap();
    let caller = Caller::unprivileged(attestation.worker);
    ledger
        .mint_echo(&caller, attestation, &signature, None, FIXTURE_NOW)
        .map(|r| r.new_balance)
}

// === Minting Tests ===

#[test]
fn test_token_metadata() {
    let ledger = sample_ledger();
    assert_eq!(ledger.name(), "VITA Token");
    assert_eq!(ledger.symbol(), "VITA");
    assert_eq!(ledger.decimals(), DECIMALS);
    assert_eq!(ledger.decimals(), 18);
}

#[test]
fn test_valid_attestation_mints_once() {
    let mut ledger = sample_ledger();
    let attestation = sample_attestation();
    let signature = fixtures().sign(&attestation).unwrap();

    let receipt = ledger
        .mint_echo(&worker(), &attestation, &signature, None, FIXTURE_NOW)
        .unwrap();
    assert_eq!(receipt.new_balance, 24_000 * PRECISION);
    assert_eq!(receipt.echo_id, 0);
    assert!(receipt.stake.is_none());
    assert_eq!(ledger.total_supply(), 24_000 * PRECISION);

    let err = ledger
        .mint_echo(&worker(), &attestation, &signature, None, FIXTURE_NOW + 1)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Replay);
    assert_eq!(ledger.total_supply(), 24_000 * PRECISION);
}

#[test]
fn test_profile_and_account_after_mint() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &attestation_with_nonce(7)).unwrap();

    let account = ledger.worker_account(&WORKER).unwrap();
    assert_eq!(account.balance, 24_000 * PRECISION);
    assert_eq!(account.nonce_high_watermark, Some(7));
    assert_eq!(account.profile.external_username, "vitalik");
    assert_eq!(account.profile.total_minted, 24_000 * PRECISION);
    assert_eq!(account.profile.last_mint_timestamp, FIXTURE_NOW);
    assert_eq!(account.profile.vitality_score, 850);
    assert!(account.profile.is_verified);

    let echo = ledger.echo(0).unwrap();
    assert_eq!(echo.worker, WORKER);
    assert_eq!(echo.pledged_hours, 160);
}

#[test]
fn test_non_oracle_signer_is_rejected() {
    let mut ledger = sample_ledger();
    let attestation = sample_attestation();
    let signature = fixtures()
        .sign_with(fixtures().rogue(), &attestation)
        .unwrap();

    let err = ledger
        .mint_echo(&worker(), &attestation, &signature, None, FIXTURE_NOW)
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::Attestation(AttestationError::UnauthorizedSigner(
            fixtures().rogue().address()
        ))
    );
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_wrong_worker_is_rejected() {
    let mut ledger = sample_ledger();
    let attestation = sample_attestation();
    let signature = fixtures().sign(&attestation).unwrap();

    let err = ledger
        .mint_echo(
            &Caller::unprivileged(INVESTOR),
            &attestation,
            &signature,
            None,
            FIXTURE_NOW,
        )
        .unwrap_err();
    assert_eq!(
        err,
        LedgerError::WorkerMismatch {
            caller: INVESTOR,
            worker: WORKER
        }
    );
    assert!(!ledger.attestations().is_nonce_consumed(&WORKER, 1));
}

#[test]
fn test_expired_attestation_is_rejected() {
    let mut ledger = sample_ledger();
    let attestation = sample_attestation();
    let signature = fixtures().sign(&attestation).unwrap();

    let err = ledger
        .mint_echo(
            &worker(),
            &attestation,
            &signature,
            None,
            attestation.valid_until + 1,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Expiry);

    // The last valid second still works.
    assert!(ledger
        .mint_echo(&worker(), &attestation, &signature, None, attestation.valid_until)
        .is_ok());
}

#[test]
fn test_issuance_policy_limits() {
    let mut ledger = sample_ledger();

    let low = Attestation {
        reliability_score: 40,
        ..attestation_with_nonce(10)
    };
    assert_eq!(
        mint(&mut ledger, &low),
        Err(LedgerError::ReliabilityTooLow { score: 40, min: 50 })
    );

    let long = Attestation {
        pledged_hours: 1001,
        ..attestation_with_nonce(11)
    };
    assert!(matches!(
        mint(&mut ledger, &long),
        Err(LedgerError::TooManyHours { hours: 1001, .. })
    ));

    let greedy = Attestation {
        token_value: 24_001 * PRECISION,
        ..attestation_with_nonce(12)
    };
    assert_eq!(
        mint(&mut ledger, &greedy),
        Err(LedgerError::ValueAboveCeiling {
            value: 24_001 * PRECISION,
            ceiling: 24_000 * PRECISION
        })
    );

    let unknown_skill = Attestation {
        skill_category: 10,
        ..attestation_with_nonce(13)
    };
    assert_eq!(mint(&mut ledger, &unknown_skill).unwrap_err().kind(), ErrorKind::Validation);

    assert_eq!(ledger.total_supply(), 0);
    assert_eq!(ledger.attestations().consumed_count(&WORKER), 0);
}

#[test]
fn test_rotated_oracle_keys() {
    let mut ledger = sample_ledger();
    let rogue = fixtures().rogue().address();
    ledger.add_oracle(&admin(), rogue).unwrap();

    let attestation = attestation_with_nonce(20);
    let signature = fixtures()
        .sign_with(fixtures().rogue(), &attestation)
        .unwrap();
    ledger
        .mint_echo(&worker(), &attestation, &signature, None, FIXTURE_NOW)
        .unwrap();

    let change = ledger
        .remove_oracle(&admin(), fixtures().oracle().address())
        .unwrap();
    assert!(matches!(change, AdminChange::OracleRemoved { before: true, .. }));
    assert_eq!(
        mint(&mut ledger, &attestation_with_nonce(21)).unwrap_err().kind(),
        ErrorKind::Authentication
    );
}

// === Collateral Tests ===

#[test]
fn test_mint_with_collateral_credits_stake() {
    let mut ledger = sample_ledger();
    let mut pool = StakingPool::new(SimulatedWrappedAsset::new(), YieldSplit::default());
    let attestation = sample_attestation();
    let signature = fixtures().sign(&attestation).unwrap();

    let receipt = ledger
        .mint_echo(
            &worker(),
            &attestation,
            &signature,
            Some(Collateral {
                pool: &mut pool,
                credentials: Caller::new(LEDGER, [Role::StakeCreditor]),
                amount: 10 * PRECISION,
            }),
            FIXTURE_NOW,
        )
        .unwrap();

    assert_eq!(receipt.stake.unwrap().deposited, 10 * PRECISION);
    assert_eq!(pool.total_staked(), 10 * PRECISION);
    assert_eq!(pool.worker_value(&WORKER), 10 * PRECISION);
}

#[test]
fn test_failed_collateral_credit_rolls_back_mint() {
    let mut ledger = sample_ledger();
    let mut pool = StakingPool::new(SimulatedWrappedAsset::new(), YieldSplit::default());
    let attestation = sample_attestation();
    let signature = fixtures().sign(&attestation).unwrap();

    let err = ledger
        .mint_echo(
            &worker(),
            &attestation,
            &signature,
            Some(Collateral {
                pool: &mut pool,
                credentials: Caller::unprivileged(LEDGER),
                amount: 10 * PRECISION,
            }),
            FIXTURE_NOW,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(ledger.total_supply(), 0);
    assert!(ledger.profile(&WORKER).is_none());
    assert!(!ledger.attestations().is_nonce_consumed(&WORKER, 1));

    // Same attestation succeeds once the credit can go through.
    assert!(ledger
        .mint_echo(&worker(), &attestation, &signature, None, FIXTURE_NOW)
        .is_ok());
}

// === Transfer Tests ===

#[test]
fn test_transfer_and_allowance_flow() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();
    ledger
        .verify_worker(&admin(), INVESTOR, "investor")
        .unwrap();

    ledger
        .transfer(&worker(), INVESTOR, 100 * PRECISION)
        .unwrap();
    assert_eq!(ledger.balance_of(&INVESTOR), 100 * PRECISION);
    assert_eq!(ledger.balance_of(&WORKER), 900 * PRECISION);

    ledger.approve(&worker(), INVESTOR, 200 * PRECISION);
    assert_eq!(ledger.allowance(&WORKER, &INVESTOR), 200 * PRECISION);
    ledger
        .transfer_from(&Caller::unprivileged(INVESTOR), WORKER, INVESTOR, 200 * PRECISION)
        .unwrap();
    assert_eq!(ledger.balance_of(&INVESTOR), 300 * PRECISION);
    assert_eq!(ledger.allowance(&WORKER, &INVESTOR), 0);

    let err = ledger
        .transfer_from(&Caller::unprivileged(INVESTOR), WORKER, INVESTOR, 1)
        .unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));
    assert!(ledger.supply_is_consistent());
}

#[test]
fn test_overdraft_and_zero_recipient() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();

    let err = ledger
        .transfer(&worker(), INVESTOR, 1_001 * PRECISION)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(
        ledger.transfer(&worker(), Address::ZERO, 1),
        Err(LedgerError::ZeroRecipient)
    );
}

#[test]
fn test_verify_worker_requires_admin() {
    let mut ledger = sample_ledger();
    let err = ledger
        .verify_worker(&worker(), INVESTOR, "investor")
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let change = ledger.verify_worker(&admin(), INVESTOR, "investor").unwrap();
    assert_eq!(
        change,
        AdminChange::WorkerVerified {
            worker: INVESTOR,
            before: false,
            after: true
        }
    );
    assert!(ledger.profile(&INVESTOR).unwrap().is_verified);
}

#[test]
fn test_record_proof_counts_only_existing_profiles() {
    let mut ledger = sample_ledger();
    assert_eq!(ledger.record_proof(INVESTOR), None);
    assert!(ledger.profile(&INVESTOR).is_none());
    assert!(ledger.worker_account(&INVESTOR).is_none());

    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();
    assert_eq!(ledger.record_proof(WORKER), Some(1));
    assert_eq!(ledger.record_proof(WORKER), Some(2));
    assert_eq!(ledger.profile(&WORKER).unwrap().proof_count, 2);
}

// === Echo Yield Tests ===

#[test]
fn test_distribute_yield_gives_worker_twenty_percent() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();
    ledger.transfer(&worker(), INVESTOR, 10 * PRECISION).unwrap();

    let dist = ledger
        .distribute_yield(&Caller::unprivileged(INVESTOR), 0, PRECISION)
        .unwrap();
    assert_eq!(dist.worker, WORKER);
    assert_eq!(dist.from, INVESTOR);
    assert_eq!(ledger.balance_of(&INVESTOR), 9 * PRECISION);
    assert_eq!(ledger.balance_of(&LEDGER), PRECISION);
    assert_eq!(ledger.pending_worker_yield(&WORKER), PRECISION / 5);
    assert_eq!(ledger.holder_yield_pool(), 4 * PRECISION / 5);
    assert!(ledger.supply_is_consistent());

    assert_eq!(ledger.claim_worker_yield(&worker()), Ok(PRECISION / 5));
    assert_eq!(ledger.balance_of(&WORKER), 990 * PRECISION + PRECISION / 5);
    assert_eq!(ledger.balance_of(&LEDGER), ledger.holder_yield_pool());
    assert_eq!(ledger.pending_worker_yield(&WORKER), 0);
    assert_eq!(ledger.total_supply(), 1_000 * PRECISION);
    assert!(ledger.supply_is_consistent());
    assert_eq!(
        ledger.claim_worker_yield(&worker()),
        Err(LedgerError::NoPendingYield(WORKER))
    );
}

#[test]
fn test_unfunded_yield_is_rejected_without_accrual() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();

    let err = ledger
        .distribute_yield(&Caller::unprivileged(INVESTOR), 0, PRECISION)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientBalance);
    assert_eq!(ledger.pending_worker_yield(&WORKER), 0);
    assert_eq!(ledger.holder_yield_pool(), 0);
    assert_eq!(ledger.balance_of(&LEDGER), 0);
}

#[test]
fn test_yield_escrow_cannot_be_moved_by_transfer() {
    let mut ledger = sample_ledger();
    mint(&mut ledger, &small_attestation(WORKER, 1)).unwrap();
    ledger.distribute_yield(&worker(), 0, 10 * PRECISION).unwrap();

    let escrow = Caller::unprivileged(LEDGER);
    let err = ledger.transfer(&escrow, INVESTOR, PRECISION).unwrap_err();
    assert_eq!(err, LedgerError::ReservedAccount(LEDGER));
    assert_eq!(err.kind(), ErrorKind::Unauthorized);
    assert_eq!(
        ledger.transfer(&worker(), LEDGER, PRECISION),
        Err(LedgerError::ReservedAccount(LEDGER))
    );
    assert_eq!(
        ledger.distribute_yield(&escrow, 0, PRECISION),
        Err(LedgerError::ReservedAccount(LEDGER))
    );
    assert_eq!(ledger.balance_of(&LEDGER), 10 * PRECISION);
}

#[test]
fn test_distribute_yield_to_unknown_echo() {
    let mut ledger = sample_ledger();
    assert_eq!(
        ledger.distribute_yield(&Caller::unprivileged(INVESTOR), 3, PRECISION),
        Err(LedgerError::UnknownEcho(3))
    );
}

// === Property Tests ===

proptest! {
    #[test]
    fn prop_transfers_conserve_supply(
        moves in prop::collection::vec((0usize..4, 0usize..4, 0u128..=30_000), 1..40)
    ) {
        let accounts = [WORKER, INVESTOR, Address([0x31; 20]), Address([0x32; 20])];
        let mut ledger = sample_ledger();
        mint(&mut ledger, &sample_attestation()).unwrap();

        for (from, to, whole) in moves {
            let caller = Caller::unprivileged(accounts[from]);
            let _ = ledger.transfer(&caller, accounts[to], whole * PRECISION);
            prop_assert!(ledger.supply_is_consistent());
        }
        prop_assert_eq!(ledger.total_supply(), 24_000 * PRECISION);
    }
}
