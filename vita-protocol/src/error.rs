//! Error type for protocol-level operations.

use thiserror::Error;
use vita_common::{CommonError, ErrorKind};
use vita_ledger::LedgerError;
use vita_proof_registry::ProofRegistryError;
use vita_staking::StakingError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProtocolError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Staking(#[from] StakingError),

    #[error(transparent)]
    Proofs(#[from] ProofRegistryError),

    #[error(transparent)]
    Access(#[from] CommonError),

    #[error("protocol state lock poisoned")]
    StatePoisoned,
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ProtocolError::Ledger(err) => err.kind(),
            ProtocolError::Staking(err) => err.kind(),
            ProtocolError::Proofs(err) => err.kind(),
            ProtocolError::Access(err) => err.kind(),
            ProtocolError::StatePoisoned => ErrorKind::Internal,
        }
    }
}
