//! Integration tests for vita-attestation.
//!
//! Sign with a real secp256k1 key, recover through the registry and exercise
//! the rejection paths a minting ledger relies on.

use vita_attestation::{
    recover_signer, typed_data_digest, Attestation, AttestationError, AttestationRegistry,
    AttestationSignature, Eip712Domain, OracleSigner,
};
use vita_common::{Address, Caller, ErrorKind, Role, PRECISION};

// === Test Fixtures ===

const ORACLE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
const SECOND_ORACLE_KEY: &str =
    "0x59c6995e998f97a5a0044966f0945389dc9e86dae88c7a8412f4603b6b78690d";
const ROGUE_KEY: &str = "0x5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";

/// secp256k1 group order, big-endian.
const CURVE_ORDER: [u8; 32] = [
    0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
    0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b, 0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
];

fn sample_domain() -> Eip712Domain {
    Eip712Domain {
        name: "VITA Protocol".into(),
        version: "1".into(),
        chain_id: 5003,
        verifying_contract: "0x5fbdb2315678afecb367f032d93f642f64180aa3".parse().unwrap(),
    }
}

fn sample_worker() -> Address {
    "0x70997970c51812dc3a010c7d01b50e0d17dc79c8".parse().unwrap()
}

fn sample_attestation(nonce: u128) -> Attestation {
    Attestation {
        worker: sample_worker(),
        external_username: "testuser".into(),
        vitality_score: 850,
        reliability_score: 80,
        pledged_hours: 100,
        skill_category: 0,
        token_value: 12_000 * PRECISION,
        valid_until: 1_700_086_400,
        nonce,
    }
}

fn oracle() -> OracleSigner {
    OracleSigner::from_hex(ORACLE_KEY).unwrap()
}

fn registry_with(oracles: &[&OracleSigner]) -> AttestationRegistry {
    AttestationRegistry::new(sample_domain(), oracles.iter().map(|o| o.address()))
}

/// `n - s` for a 32-byte big-endian scalar.
fn negate_scalar(s: &[u8; 32]) -> [u8; 32] {
    let mut out = [0u8; 32];
    let mut borrow = 0i16;
    for i in (0..32).rev() {
        let mut diff = CURVE_ORDER[i] as i16 - s[i] as i16 - borrow;
        if diff < 0 {
            diff += 256;
            borrow = 1;
        } else {
            borrow = 0;
        }
        out[i] = diff as u8;
    }
    out
}

// === Signature Verification Tests ===

#[test]
fn test_authorized_oracle_signature_verifies() {
    let oracle = oracle();
    let registry = registry_with(&[&oracle]);
    let attestation = sample_attestation(1);
    let signature = oracle.sign_attestation(&sample_domain(), &attestation).unwrap();

    let signer = registry.verify_signer(&attestation, &signature).unwrap();
    assert_eq!(signer, oracle.address());
}

#[test]
fn test_non_oracle_signature_is_rejected() {
    let oracle = oracle();
    let rogue = OracleSigner::from_hex(ROGUE_KEY).unwrap();
    let registry = registry_with(&[&oracle]);
    let attestation = sample_attestation(1);
    let signature = rogue.sign_attestation(&sample_domain(), &attestation).unwrap();

    let err = registry.verify_signer(&attestation, &signature).unwrap_err();
    assert_eq!(err, AttestationError::UnauthorizedSigner(rogue.address()));
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_signature_over_other_domain_is_rejected() {
    let oracle = oracle();
    let registry = registry_with(&[&oracle]);
    let attestation = sample_attestation(1);

    let mut foreign = sample_domain();
    foreign.chain_id = 1;
    let signature = oracle.sign_attestation(&foreign, &attestation).unwrap();

    let err = registry.verify_signer(&attestation, &signature).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
}

#[test]
fn test_tampered_payload_is_rejected() {
    let oracle = oracle();
    let registry = registry_with(&[&oracle]);
    let attestation = sample_attestation(1);
    let signature = oracle.sign_attestation(&sample_domain(), &attestation).unwrap();

    let mut inflated = attestation.clone();
    inflated.token_value *= 10;
    assert!(registry.verify_signer(&inflated, &signature).is_err());
}

#[test]
fn test_high_s_signature_is_rejected() {
    let oracle = oracle();
    let attestation = sample_attestation(1);
    let digest = typed_data_digest(&sample_domain(), &attestation);
    let signature = oracle.sign_digest(&digest).unwrap();

    // (r, n - s) with the flipped recovery bit recovers the same key in raw ECDSA.
    let malleated = AttestationSignature {
        r: signature.r,
        s: negate_scalar(&signature.s),
        v: if signature.v == 27 { 28 } else { 27 },
    };
    assert_eq!(recover_signer(&digest, &malleated), Err(AttestationError::HighS));
}

#[test]
fn test_raw_recovery_byte_is_accepted() {
    let oracle = oracle();
    let digest = [0x17u8; 32];
    let mut signature = oracle.sign_digest(&digest).unwrap();
    signature.v -= 27;
    assert_eq!(recover_signer(&digest, &signature).unwrap(), oracle.address());
}

// === Oracle Rotation Tests ===

#[test]
fn test_multiple_oracles_valid_concurrently() {
    let first = oracle();
    let second = OracleSigner::from_hex(SECOND_ORACLE_KEY).unwrap();
    let registry = registry_with(&[&first, &second]);

    for (nonce, signer) in [(1u128, &first), (2u128, &second)] {
        let attestation = sample_attestation(nonce);
        let signature = signer.sign_attestation(&sample_domain(), &attestation).unwrap();
        assert_eq!(
            registry.verify_signer(&attestation, &signature).unwrap(),
            signer.address()
        );
    }
}

#[test]
fn test_removed_oracle_is_no_longer_trusted() {
    let first = oracle();
    let second = OracleSigner::from_hex(SECOND_ORACLE_KEY).unwrap();
    let mut registry = registry_with(&[&first]);
    let admin = Caller::new(Address([0xad; 20]), [Role::Admin]);

    registry.add_oracle(&admin, second.address()).unwrap();
    registry.remove_oracle(&admin, first.address()).unwrap();

    let attestation = sample_attestation(9);
    let old = first.sign_attestation(&sample_domain(), &attestation).unwrap();
    let new = second.sign_attestation(&sample_domain(), &attestation).unwrap();
    assert_eq!(
        registry.verify_signer(&attestation, &old),
        Err(AttestationError::UnauthorizedSigner(first.address()))
    );
    assert!(registry.verify_signer(&attestation, &new).is_ok());
}

// === Replay Tests ===

#[test]
fn test_replay_is_rejected_deterministically() {
    let mut registry = registry_with(&[]);
    let attestation = sample_attestation(42);
    let now = attestation.valid_until - 10;

    registry
        .validate_and_consume(attestation.worker, attestation.nonce, attestation.valid_until, now)
        .unwrap();
    for _ in 0..3 {
        let err = registry
            .validate_and_consume(attestation.worker, attestation.nonce, attestation.valid_until, now)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Replay);
    }
}

#[test]
fn test_expiry_is_distinguished_from_replay() {
    let registry = registry_with(&[]);
    let attestation = sample_attestation(1);
    let err = registry
        .check(
            &attestation.worker,
            attestation.nonce,
            attestation.valid_until,
            attestation.valid_until + 1,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Expiry);
}

#[test]
fn test_signature_json_round_trip() {
    let oracle = oracle();
    let signature = oracle.sign_digest(&[1u8; 32]).unwrap();
    let json = serde_json::to_string(&signature).unwrap();
    assert!(json.starts_with("\"0x"));
    let back: AttestationSignature = serde_json::from_str(&json).unwrap();
    assert_eq!(back, signature);
}
