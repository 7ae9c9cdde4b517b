use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use vita_attestation::{Attestation, AttestationSignature, Eip712Domain, OracleSigner};
use vita_common::{Address, ProtocolConfig, PRECISION};
use vita_proof_registry::{Groth16Proof, PublicSignals};

mod verifier;

pub use verifier::ScriptedVerifier;

/// Well-known development key #2; address `0x3c44…93bc`.
pub const ORACLE_KEY_HEX: &str =
    "5de4111afa1a4b94908f83103eb1f1706367c2e68ca870fc3fb9a804cdab365a";
/// Development key #3, never authorized.
pub const ROGUE_KEY_HEX: &str =
    "7c852118294e51e653712a81e05800f419141751be58f605c371e15141b007a6";

pub const ADMIN: Address = Address([
    0xf3, 0x9f, 0xd6, 0xe5, 0x1a, 0xad, 0x88, 0xf6, 0xf4, 0xce, 0x6a, 0xb8, 0x82, 0x72, 0x79,
    0xcf, 0xff, 0xb9, 0x22, 0x66,
]);
pub const WORKER: Address = Address([
    0x70, 0x99, 0x79, 0x70, 0xc5, 0x18, 0x12, 0xdc, 0x3a, 0x01, 0x0c, 0x7d, 0x01, 0xb5, 0x0e,
    0x0d, 0x17, 0xdc, 0x79, 0xc8,
]);
pub const INVESTOR: Address = Address([0x90; 20]);
/// Ledger identity and EIP-712 verifying contract.
pub const LEDGER: Address = Address([
    0x5f, 0xbd, 0xb2, 0x31, 0x56, 0x78, 0xaf, 0xec, 0xb3, 0x67, 0xf0, 0x32, 0xd9, 0x3f, 0x64,
    0x2f, 0x64, 0x18, 0x0a, 0xa3,
]);

/// Fixed "now" for every fixture-driven test.
pub const FIXTURE_NOW: u64 = 1_700_000_000;

static FIXTURES: OnceCell<TestFixtures> = OnceCell::new();

/// Keys and configuration reused across tests.
pub struct TestFixtures {
    oracle: OracleSigner,
    rogue: OracleSigner,
    config: ProtocolConfig,
    attestation_json: String,
}

impl TestFixtures {
    pub fn oracle(&self) -> &OracleSigner {
        &self.oracle
    }

    /// Valid key that is not in any oracle set.
    pub fn rogue(&self) -> &OracleSigner {
        &self.rogue
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    pub fn domain(&self) -> Eip712Domain {
        Eip712Domain::from(&self.config.domain)
    }

    /// `sample_attestation()` in its oracle wire form.
    pub fn attestation_json(&self) -> &str {
        &self.attestation_json
    }

    pub fn sign(&self, attestation: &Attestation) -> Result<AttestationSignature> {
        self.oracle
            .sign_attestation(&self.domain(), attestation)
            .context("sign fixture attestation")
    }

    pub fn sign_with(
        &self,
        signer: &OracleSigner,
        attestation: &Attestation,
    ) -> Result<AttestationSignature> {
        signer
            .sign_attestation(&self.domain(), attestation)
            .context("sign attestation with custom key")
    }
}

pub fn fixtures() -> &'static TestFixtures {
    FIXTURES.get_or_init(|| build_fixtures().expect("failed to build vita test fixtures"))
}

fn build_fixtures() -> Result<TestFixtures> {
    let oracle = OracleSigner::from_hex(ORACLE_KEY_HEX).context("oracle key")?;
    let rogue = OracleSigner::from_hex(ROGUE_KEY_HEX).context("rogue key")?;

    let mut config = ProtocolConfig::default();
    config.domain.verifying_contract = LEDGER;

    let attestation_json =
        serde_json::to_string_pretty(&sample_attestation()).context("encode attestation")?;

    Ok(TestFixtures {
        oracle,
        rogue,
        config,
        attestation_json,
    })
}

// ═══════════════════════════════════════════════════════════════════════════════
// SAMPLE PAYLOADS
// ═══════════════════════════════════════════════════════════════════════════════

/// Solidity dev, 160 h, full reliability: 24 000 VITA at t = 0.
pub fn sample_attestation() -> Attestation {
    Attestation {
        worker: WORKER,
        external_username: "vitalik".into(),
        vitality_score: 850,
        reliability_score: 100,
        pledged_hours: 160,
        skill_category: 0,
        token_value: 24_000 * PRECISION,
        valid_until: FIXTURE_NOW + 86_400,
        nonce: 1,
    }
}

/// Same worker and terms as [`sample_attestation`] under another nonce.
pub fn attestation_with_nonce(nonce: u128) -> Attestation {
    Attestation {
        nonce,
        ..sample_attestation()
    }
}

/// Smaller mint matching the reference token tests: 100 h at 80%
/// reliability, 1 000 VITA.
pub fn small_attestation(worker: Address, nonce: u128) -> Attestation {
    Attestation {
        worker,
        external_username: "testuser".into(),
        reliability_score: 80,
        pledged_hours: 100,
        token_value: 1_000 * PRECISION,
        nonce,
        ..sample_attestation()
    }
}

pub fn sample_proof() -> Result<Groth16Proof> {
    Groth16Proof::from_snarkjs_json(
        r#"{
            "pi_a": ["11", "12", "1"],
            "pi_b": [["13", "14"], ["15", "16"], ["1", "0"]],
            "pi_c": ["17", "18", "1"],
            "protocol": "groth16",
            "curve": "bn128"
        }"#,
    )
    .context("parse fixture proof")
}

/// Public signals in circuit order with the given hash, quality and worker
/// commitment.
pub fn sample_signals(proof_hash: u64, quality: u64, worker_commitment: u64) -> Result<PublicSignals> {
    let values = [
        proof_hash.to_string(),
        quality.to_string(),
        "201".to_string(),
        "301".to_string(),
        worker_commitment.to_string(),
        FIXTURE_NOW.to_string(),
        "10".to_string(),
    ];
    PublicSignals::from_decimal(&values).context("build fixture signals")
}
