//! Error taxonomy shared across the VITA crates.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{access::Role, Address};

/// Coarse classification every crate error maps onto.
///
/// Callers use the kind to decide what to do next: `Expiry` means "fetch a
/// fresh attestation", `Replay` means "already processed", everything else is
/// surfaced as-is. Nothing inside the core retries on any kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    /// Bad signature or unauthorized signer.
    Authentication,
    /// Nonce or proof hash already consumed.
    Replay,
    /// Attestation validity window elapsed.
    Expiry,
    /// Ledger debit larger than the balance or allowance.
    InsufficientBalance,
    /// Caller lacks the role or identity an operation requires.
    Unauthorized,
    /// Proof rejected by quality gate or verifier.
    InvalidProof,
    /// Malformed or out-of-policy input.
    Validation,
    /// Broken internal state (poisoned lock, invariant violation).
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Authentication => "AUTHENTICATION",
            ErrorKind::Replay => "REPLAY",
            ErrorKind::Expiry => "EXPIRY",
            ErrorKind::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidProof => "INVALID_PROOF",
            ErrorKind::Validation => "VALIDATION",
            ErrorKind::Internal => "INTERNAL",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by the shared primitives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommonError {
    #[error("caller {caller} is missing role {role}")]
    MissingRole { caller: Address, role: Role },

    #[error("cannot revoke the last admin ({0})")]
    LastAdmin(Address),

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("arithmetic overflow in {0}")]
    Overflow(&'static str),

    #[error("invalid config: {0}")]
    Config(String),
}

impl CommonError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CommonError::MissingRole { .. } => ErrorKind::Unauthorized,
            CommonError::LastAdmin(_)
            | CommonError::InvalidAddress(_)
            | CommonError::Overflow(_)
            | CommonError::Config(_) => ErrorKind::Validation,
        }
    }
}
