//! Error types for proof admission.

use thiserror::Error;
use vita_common::{CommonError, ErrorKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProofRegistryError {
    #[error("quality score {score} below minimum {min}")]
    QualityScoreTooLow { score: u64, min: u64 },

    #[error("proof {0} already submitted")]
    ProofAlreadySubmitted(String),

    #[error("proof rejected by verifier {0}")]
    InvalidProof(String),

    #[error("invalid public signals: {0}")]
    InvalidSignals(String),

    #[error("malformed proof encoding: {0}")]
    MalformedProof(String),

    #[error(transparent)]
    Access(#[from] CommonError),
}

impl ProofRegistryError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProofRegistryError::QualityScoreTooLow { .. }
            | ProofRegistryError::InvalidSignals(_)
            | ProofRegistryError::MalformedProof(_) => ErrorKind::Validation,
            ProofRegistryError::ProofAlreadySubmitted(_) => ErrorKind::Replay,
            ProofRegistryError::InvalidProof(_) => ErrorKind::InvalidProof,
            ProofRegistryError::Access(err) => err.kind(),
        }
    }
}
