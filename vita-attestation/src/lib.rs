//! vita-attestation
//!
//! Oracle attestations authorize every VITA mint. This crate provides:
//! - the [`Attestation`] payload and its JSON wire form,
//! - EIP-712 typed-data hashing under a [`eip712::Eip712Domain`],
//! - secp256k1 signer recovery with malleability rejection,
//! - an [`OracleSigner`] for producing attestations,
//! - the [`AttestationRegistry`]: the authorized-oracle set and the per-worker
//!   consumed-nonce space.

use serde::{Deserialize, Serialize};
use vita_common::Address;

pub mod eip712;
pub mod error;
pub mod registry;
pub mod signature;
pub mod signer;

pub use eip712::{struct_hash, typed_data_digest, Eip712Domain};
pub use error::AttestationError;
pub use registry::AttestationRegistry;
pub use signature::{recover_signer, AttestationSignature};
pub use signer::OracleSigner;

/// Upper bound of the vitality score scale.
pub const MAX_VITALITY_SCORE: u16 = 1000;
/// Upper bound of the reliability score scale.
pub const MAX_RELIABILITY_SCORE: u8 = 100;

/// Signed claim authorizing a specific mint amount for one worker and nonce.
///
/// Scores are carried on their canonical integer scales (vitality 0–1000,
/// reliability 0–100) and signed as `uint256`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub worker: Address,
    /// External (GitHub) username the oracle scored.
    #[serde(rename = "githubUsername")]
    pub external_username: String,
    pub vitality_score: u16,
    pub reliability_score: u8,
    pub pledged_hours: u64,
    pub skill_category: u8,
    /// Token amount, 18-decimal fixed point.
    #[serde(with = "vita_common::u128_string")]
    pub token_value: u128,
    /// Unix seconds; the attestation is usable while `now <= valid_until`.
    pub valid_until: u64,
    #[serde(with = "vita_common::u128_string")]
    pub nonce: u128,
}

impl Attestation {
    /// Check that scores are on their declared scales.
    pub fn validate_scales(&self) -> Result<(), AttestationError> {
        if self.vitality_score > MAX_VITALITY_SCORE {
            return Err(AttestationError::InvalidField {
                field: "vitalityScore",
                reason: format!("{} exceeds {MAX_VITALITY_SCORE}", self.vitality_score),
            });
        }
        if self.reliability_score > MAX_RELIABILITY_SCORE {
            return Err(AttestationError::InvalidField {
                field: "reliabilityScore",
                reason: format!("{} exceeds {MAX_RELIABILITY_SCORE}", self.reliability_score),
            });
        }
        Ok(())
    }
}
