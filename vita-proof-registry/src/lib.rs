//! vita-proof-registry
//!
//! Admission of zero-knowledge proof-of-work submissions. A submission is a
//! Groth16 proof plus the circuit's ordered public signals; admission checks
//! the quality threshold, rejects duplicate work hashes, asks the configured
//! [`ProofVerifier`] and then records the proof write-once.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vita_common::{AdminChange, Address, Caller, ProofConfig, Role, Timestamp};

pub mod error;
pub mod field;
pub mod proof;
pub mod signals;
pub mod verifier;

pub use error::ProofRegistryError;
pub use field::Word;
pub use proof::{Fq2Word, G1Point, G2Point, Groth16Proof, SnarkjsProof};
pub use signals::{PublicSignals, SIGNAL_COUNT};
pub use verifier::{ProofVerifier, StructuralVerifier};

pub const DEFAULT_MIN_QUALITY_SCORE: u64 = 50;

// ═══════════════════════════════════════════════════════════════════════════════
// RECORDS
// ═══════════════════════════════════════════════════════════════════════════════

/// An admitted proof. Never modified after insertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkProofRecord {
    #[serde(with = "vita_common::hex_bytes32")]
    pub proof_hash: Word,
    pub quality_score: u64,
    #[serde(with = "vita_common::hex_bytes32")]
    pub repo_commitment: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub commit_hash: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub worker_commitment: Word,
    /// Circuit-reported work timestamp.
    pub timestamp: u64,
    pub min_lines: u64,
    pub submitter: Address,
    pub admitted_at: Timestamp,
    /// blake3 of the proof coordinates.
    pub fingerprint: String,
}

/// `WorkProofSubmitted` event payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkProofSubmitted {
    #[serde(with = "vita_common::hex_bytes32")]
    pub proof_hash: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub worker_commitment: Word,
    pub quality_score: u64,
    pub timestamp: u64,
}

impl From<&WorkProofRecord> for WorkProofSubmitted {
    fn from(record: &WorkProofRecord) -> Self {
        Self {
            proof_hash: record.proof_hash,
            worker_commitment: record.worker_commitment,
            quality_score: record.quality_score,
            timestamp: record.timestamp,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

pub struct WorkProofRegistry {
    verifier: Box<dyn ProofVerifier>,
    min_quality_score: u64,
    proofs: HashMap<Word, WorkProofRecord>,
    worker_counts: HashMap<Word, u64>,
}

impl std::fmt::Debug for WorkProofRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkProofRegistry")
            .field("verifier", &self.verifier.name())
            .field("min_quality_score", &self.min_quality_score)
            .field("proofs", &self.proofs.len())
            .finish()
    }
}

impl WorkProofRegistry {
    pub fn new(verifier: Box<dyn ProofVerifier>) -> Self {
        Self {
            verifier,
            min_quality_score: DEFAULT_MIN_QUALITY_SCORE,
            proofs: HashMap::new(),
            worker_counts: HashMap::new(),
        }
    }

    pub fn from_config(config: &ProofConfig, verifier: Box<dyn ProofVerifier>) -> Self {
        Self {
            min_quality_score: config.min_quality_score,
            ..Self::new(verifier)
        }
    }

    /// Admit a proof. Checks run cheapest first (signal range, quality,
    /// uniqueness); the verifier is only consulted once those pass.
    pub fn submit_work_proof(
        &mut self,
        submitter: Address,
        proof: &Groth16Proof,
        signals: &PublicSignals,
        now: Timestamp,
    ) -> Result<WorkProofRecord, ProofRegistryError> {
        signals.validate()?;
        if signals.quality_score < self.min_quality_score {
            warn!(
                quality = signals.quality_score,
                min = self.min_quality_score,
                "proof rejected: quality too low"
            );
            return Err(ProofRegistryError::QualityScoreTooLow {
                score: signals.quality_score,
                min: self.min_quality_score,
            });
        }
        if self.proofs.contains_key(&signals.work_proof_hash) {
            return Err(ProofRegistryError::ProofAlreadySubmitted(
                field::word_to_decimal(&signals.work_proof_hash),
            ));
        }
        if !self.verifier.verify(proof, signals) {
            warn!(verifier = self.verifier.name(), "proof rejected by verifier");
            return Err(ProofRegistryError::InvalidProof(
                self.verifier.name().to_string(),
            ));
        }

        let record = WorkProofRecord {
            proof_hash: signals.work_proof_hash,
            quality_score: signals.quality_score,
            repo_commitment: signals.repo_commitment,
            commit_hash: signals.commit_hash,
            worker_commitment: signals.worker_commitment,
            timestamp: signals.timestamp,
            min_lines: signals.min_lines,
            submitter,
            admitted_at: now,
            fingerprint: proof.fingerprint(),
        };
        self.proofs.insert(record.proof_hash, record.clone());
        *self.worker_counts.entry(record.worker_commitment).or_insert(0) += 1;

        let event = WorkProofSubmitted::from(&record);
        info!(
            proof_hash = %field::word_to_decimal(&event.proof_hash),
            worker_commitment = %field::word_to_decimal(&event.worker_commitment),
            quality = event.quality_score,
            timestamp = event.timestamp,
            "work proof admitted"
        );
        Ok(record)
    }

    pub fn set_min_quality_score(
        &mut self,
        caller: &Caller,
        score: u64,
    ) -> Result<AdminChange, ProofRegistryError> {
        caller.require(Role::Admin)?;
        let before = std::mem::replace(&mut self.min_quality_score, score);
        Ok(AdminChange::MinQualityScore {
            before,
            after: score,
        })
    }

    /// Swap the verifier. Existing records are unaffected.
    pub fn set_verifier(
        &mut self,
        caller: &Caller,
        verifier: Box<dyn ProofVerifier>,
    ) -> Result<AdminChange, ProofRegistryError> {
        caller.require(Role::Admin)?;
        let previous = std::mem::replace(&mut self.verifier, verifier);
        Ok(AdminChange::ProofVerifier {
            before: previous.name().to_string(),
            after: self.verifier.name().to_string(),
        })
    }

    // === Views ===

    pub fn is_proof_submitted(&self, proof_hash: &Word) -> bool {
        self.proofs.contains_key(proof_hash)
    }

    pub fn get_proof(&self, proof_hash: &Word) -> Option<&WorkProofRecord> {
        self.proofs.get(proof_hash)
    }

    pub fn worker_proof_count(&self, worker_commitment: &Word) -> u64 {
        self.worker_counts.get(worker_commitment).copied().unwrap_or(0)
    }

    pub fn total_proofs(&self) -> usize {
        self.proofs.len()
    }

    pub fn min_quality_score(&self) -> u64 {
        self.min_quality_score
    }

    pub fn verifier_name(&self) -> &str {
        self.verifier.name()
    }
}
