//! Ordered public signals of the proof-of-work circuit.

use serde::{Deserialize, Serialize};

use crate::field::{self, Word};
use crate::ProofRegistryError;

/// Number of public signals the circuit exposes.
pub const SIGNAL_COUNT: usize = 7;

/// Public outputs in circuit order:
/// `[workProofHash, qualityScore, repoCommitment, commitHash,
///   workerCommitment, timestamp, minLines]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicSignals {
    #[serde(with = "vita_common::hex_bytes32")]
    pub work_proof_hash: Word,
    pub quality_score: u64,
    #[serde(with = "vita_common::hex_bytes32")]
    pub repo_commitment: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub commit_hash: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub worker_commitment: Word,
    pub timestamp: u64,
    pub min_lines: u64,
}

impl PublicSignals {
    pub fn from_words(words: &[Word]) -> Result<Self, ProofRegistryError> {
        if words.len() != SIGNAL_COUNT {
            return Err(ProofRegistryError::InvalidSignals(format!(
                "expected {SIGNAL_COUNT} signals, got {}",
                words.len()
            )));
        }
        check_scalars(words)?;
        let small = |index: usize, name: &str| {
            field::word_to_u64(&words[index]).ok_or_else(|| {
                ProofRegistryError::InvalidSignals(format!("{name} does not fit in u64"))
            })
        };
        Ok(Self {
            work_proof_hash: words[0],
            quality_score: small(1, "qualityScore")?,
            repo_commitment: words[2],
            commit_hash: words[3],
            worker_commitment: words[4],
            timestamp: small(5, "timestamp")?,
            min_lines: small(6, "minLines")?,
        })
    }

    /// Parse the `publicSignals` array snarkjs writes (decimal strings).
    pub fn from_decimal<S: AsRef<str>>(values: &[S]) -> Result<Self, ProofRegistryError> {
        let words = values
            .iter()
            .map(|v| field::parse_word(v.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::from_words(&words)
    }

    /// Reject any signal at or above the scalar modulus.
    ///
    /// Deserialized signals bypass [`from_words`](Self::from_words), and a
    /// verifier reducing inputs mod r would treat `h` and `h + r` as one
    /// value, so admission calls this before keying on the hash.
    pub fn validate(&self) -> Result<(), ProofRegistryError> {
        check_scalars(&self.to_words())
    }

    pub fn to_words(&self) -> [Word; SIGNAL_COUNT] {
        [
            self.work_proof_hash,
            field::word_from_u64(self.quality_score),
            self.repo_commitment,
            self.commit_hash,
            self.worker_commitment,
            field::word_from_u64(self.timestamp),
            field::word_from_u64(self.min_lines),
        ]
    }

    pub fn to_decimal(&self) -> Vec<String> {
        self.to_words().iter().map(field::word_to_decimal).collect()
    }
}

fn check_scalars(words: &[Word]) -> Result<(), ProofRegistryError> {
    match words.iter().position(|w| !field::is_scalar(w)) {
        Some(index) => Err(ProofRegistryError::InvalidSignals(format!(
            "signal {index} is not a field scalar"
        ))),
        None => Ok(()),
    }
}
