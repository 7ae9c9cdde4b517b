//! Error types for attestation verification.

use thiserror::Error;
use vita_common::{Address, CommonError, ErrorKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AttestationError {
    // ═══════════════════════════════════════════════════════════════════════════
    // SIGNATURE
    // ═══════════════════════════════════════════════════════════════════════════
    #[error("malformed signature: {0}")]
    MalformedSignature(String),

    #[error("invalid recovery id: {0}")]
    InvalidRecoveryId(u8),

    #[error("non-canonical signature: s is in the upper half of the curve order")]
    HighS,

    #[error("signer recovery failed")]
    RecoveryFailed,

    #[error("invalid oracle signature: recovered signer {0} is not authorized")]
    UnauthorizedSigner(Address),

    // ═══════════════════════════════════════════════════════════════════════════
    // FRESHNESS / REPLAY
    // ═══════════════════════════════════════════════════════════════════════════
    #[error("attestation expired: valid until {valid_until}, now {now}")]
    Expired { valid_until: u64, now: u64 },

    #[error("invalid nonce: {nonce} already consumed for worker {worker}")]
    NonceReused { worker: Address, nonce: u128 },

    // ═══════════════════════════════════════════════════════════════════════════
    // PAYLOAD / KEYS
    // ═══════════════════════════════════════════════════════════════════════════
    #[error("invalid attestation field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("invalid signing key: {0}")]
    InvalidKey(String),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Access(#[from] CommonError),
}

impl AttestationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AttestationError::MalformedSignature(_)
            | AttestationError::InvalidRecoveryId(_)
            | AttestationError::HighS
            | AttestationError::RecoveryFailed
            | AttestationError::UnauthorizedSigner(_) => ErrorKind::Authentication,
            AttestationError::Expired { .. } => ErrorKind::Expiry,
            AttestationError::NonceReused { .. } => ErrorKind::Replay,
            AttestationError::InvalidField { .. }
            | AttestationError::InvalidKey(_)
            | AttestationError::Signing(_) => ErrorKind::Validation,
            AttestationError::Access(err) => err.kind(),
        }
    }
}
