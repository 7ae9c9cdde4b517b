//! Integration tests for vita-proof-registry.

use vita_common::{AdminChange, Address, Caller, ErrorKind, Role};
use vita_proof_registry::{
    field::word_from_u64, Groth16Proof, ProofRegistryError, PublicSignals, StructuralVerifier,
    WorkProofRegistry,
};
use vita_test_fixtures::ScriptedVerifier;

// === Test Fixtures ===

const SUBMITTER: Address = Address([0x51; 20]);
const NOW: u64 = 1_700_000_000;

fn admin() -> Caller {
    Caller::new(Address([0xad; 20]), [Role::Admin])
}

fn sample_proof() -> Groth16Proof {
    Groth16Proof::from_snarkjs_json(
        r#"{
            "pi_a": ["11", "12", "1"],
            "pi_b": [["13", "14"], ["15", "16"], ["1", "0"]],
            "pi_c": ["17", "18", "1"],
            "protocol": "groth16"
        }"#,
    )
    .unwrap()
}

fn sample_signals(hash: u64, quality: u64, worker: u64) -> PublicSignals {
    let values = [
        hash.to_string(),
        quality.to_string(),
        "201".to_string(),
        "301".to_string(),
        worker.to_string(),
        NOW.to_string(),
        "10".to_string(),
    ];
    PublicSignals::from_decimal(&values).unwrap()
}

fn sample_registry() -> (WorkProofRegistry, ScriptedVerifier) {
    let verifier = ScriptedVerifier::accepting();
    (WorkProofRegistry::new(Box::new(verifier.clone())), verifier)
}

// === Admission Tests ===

#[test]
fn test_valid_proof_is_recorded() {
    let (mut registry, verifier) = sample_registry();
    let record = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(101, 80, 401), NOW)
        .unwrap();

    assert_eq!(record.quality_score, 80);
    assert_eq!(record.submitter, SUBMITTER);
    assert_eq!(record.fingerprint, sample_proof().fingerprint());
    assert!(registry.is_proof_submitted(&word_from_u64(101)));
    assert_eq!(registry.get_proof(&word_from_u64(101)), Some(&record));
    assert_eq!(registry.worker_proof_count(&word_from_u64(401)), 1);
    assert_eq!(registry.total_proofs(), 1);
    assert_eq!(verifier.calls(), 1);
}

#[test]
fn test_duplicate_hash_is_rejected() {
    let (mut registry, verifier) = sample_registry();
    let signals = sample_signals(102, 80, 402);
    registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &signals, NOW)
        .unwrap();

    let err = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &signals, NOW + 1)
        .unwrap_err();
    assert!(matches!(err, ProofRegistryError::ProofAlreadySubmitted(_)));
    assert_eq!(err.kind(), ErrorKind::Replay);
    assert_eq!(registry.worker_proof_count(&word_from_u64(402)), 1);
    assert_eq!(verifier.calls(), 1);
}

#[test]
fn test_hash_aliased_above_modulus_is_rejected() {
    let (mut registry, verifier) = sample_registry();
    registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(101, 80, 401), NOW)
        .unwrap();

    // 101 + r: the same field element as 101, only reachable through serde.
    let mut json = serde_json::to_value(sample_signals(101, 80, 401)).unwrap();
    json["workProofHash"] =
        "0x30644e72e131a029b85045b68181585d2833e84879b9709143e1f593f0000066".into();
    let aliased: PublicSignals = serde_json::from_value(json).unwrap();
    assert_ne!(aliased.work_proof_hash, word_from_u64(101));

    let err = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &aliased, NOW + 1)
        .unwrap_err();
    assert!(matches!(err, ProofRegistryError::InvalidSignals(_)));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!registry.is_proof_submitted(&aliased.work_proof_hash));
    assert_eq!(registry.total_proofs(), 1);
    assert_eq!(registry.worker_proof_count(&word_from_u64(401)), 1);
    assert_eq!(verifier.calls(), 1);
}

#[test]
fn test_low_quality_never_reaches_verifier() {
    let (mut registry, verifier) = sample_registry();
    let err = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(103, 40, 403), NOW)
        .unwrap_err();
    assert_eq!(
        err,
        ProofRegistryError::QualityScoreTooLow { score: 40, min: 50 }
    );
    assert_eq!(verifier.calls(), 0);
    assert_eq!(registry.total_proofs(), 0);
}

#[test]
fn test_quality_at_threshold_is_admitted() {
    let (mut registry, _) = sample_registry();
    assert!(registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(104, 50, 404), NOW)
        .is_ok());
}

#[test]
fn test_verifier_rejection_leaves_no_record() {
    let (mut registry, verifier) = sample_registry();
    verifier.set_accept(false);
    let err = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(105, 80, 405), NOW)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidProof);
    assert!(!registry.is_proof_submitted(&word_from_u64(105)));

    verifier.set_accept(true);
    assert!(registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(105, 80, 405), NOW)
        .is_ok());
}

#[test]
fn test_counts_are_per_worker_commitment() {
    let (mut registry, _) = sample_registry();
    for hash in 0..3 {
        registry
            .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(200 + hash, 90, 7), NOW)
            .unwrap();
    }
    registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(300, 90, 8), NOW)
        .unwrap();
    assert_eq!(registry.worker_proof_count(&word_from_u64(7)), 3);
    assert_eq!(registry.worker_proof_count(&word_from_u64(8)), 1);
    assert_eq!(registry.worker_proof_count(&word_from_u64(9)), 0);
    assert_eq!(registry.total_proofs(), 4);
}

// === Admin Tests ===

#[test]
fn test_min_quality_score_is_admin_only_and_audited() {
    let (mut registry, _) = sample_registry();
    let err = registry
        .set_min_quality_score(&Caller::unprivileged(SUBMITTER), 10)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Unauthorized);

    let change = registry.set_min_quality_score(&admin(), 60).unwrap();
    assert_eq!(change, AdminChange::MinQualityScore { before: 50, after: 60 });
    assert_eq!(registry.min_quality_score(), 60);

    let err = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(106, 55, 406), NOW)
        .unwrap_err();
    assert!(matches!(err, ProofRegistryError::QualityScoreTooLow { .. }));
}

#[test]
fn test_verifier_replacement_keeps_records() {
    let (mut registry, _) = sample_registry();
    registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(107, 80, 407), NOW)
        .unwrap();

    let change = registry
        .set_verifier(&admin(), Box::new(StructuralVerifier))
        .unwrap();
    assert_eq!(
        change,
        AdminChange::ProofVerifier {
            before: "scripted".into(),
            after: "structural".into(),
        }
    );
    assert_eq!(registry.verifier_name(), "structural");
    assert!(registry.is_proof_submitted(&word_from_u64(107)));
}

#[test]
fn test_structural_verifier_rejects_zero_proof() {
    let mut registry = WorkProofRegistry::new(Box::new(StructuralVerifier));
    let zero = Groth16Proof::from_snarkjs_json(
        r#"{"pi_a": ["0", "0"], "pi_b": [["0", "0"], ["0", "0"]], "pi_c": ["0", "0"]}"#,
    )
    .unwrap();
    let err = registry
        .submit_work_proof(SUBMITTER, &zero, &sample_signals(108, 80, 408), NOW)
        .unwrap_err();
    assert_eq!(err, ProofRegistryError::InvalidProof("structural".into()));
}

#[test]
fn test_record_serializes_with_hex_words() {
    let (mut registry, _) = sample_registry();
    let record = registry
        .submit_work_proof(SUBMITTER, &sample_proof(), &sample_signals(109, 80, 409), NOW)
        .unwrap();
    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(
        json["proofHash"],
        format!("0x{}", "0".repeat(62) + "6d")
    );
    assert_eq!(json["qualityScore"], 80);
}
