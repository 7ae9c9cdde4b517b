//! Error types for the staking pool.

use thiserror::Error;
use vita_common::{Address, CommonError, ErrorKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StakingError {
    #[error("zero amount")]
    ZeroAmount,

    #[error("caller {caller} does not own the stake of {worker}")]
    NotPositionOwner { caller: Address, worker: Address },

    #[error("no active stake for {0}")]
    NoActivePosition(Address),

    #[error("no accrued yield for {0}")]
    NoYield(Address),

    #[error("insufficient wrapped supply: requested {requested}, outstanding {outstanding}")]
    InsufficientWrapped { requested: u128, outstanding: u128 },

    #[error("wrapped asset error: {0}")]
    Asset(String),

    #[error("staking overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Access(#[from] CommonError),
}

impl StakingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StakingError::NotPositionOwner { .. } => ErrorKind::Unauthorized,
            StakingError::Access(err) => err.kind(),
            StakingError::Asset(_) | StakingError::InsufficientWrapped { .. } => {
                ErrorKind::Internal
            }
            StakingError::ZeroAmount
            | StakingError::NoActivePosition(_)
            | StakingError::NoYield(_)
            | StakingError::Overflow(_) => ErrorKind::Validation,
        }
    }
}
