//! Error types for the minting ledger.

use thiserror::Error;
use vita_attestation::AttestationError;
use vita_common::{Address, CommonError, ErrorKind};
use vita_staking::StakingError;
use vita_valuation::ValuationError;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    // ═══════════════════════════════════════════════════════════════════════════
    // MINTING
    // ═══════════════════════════════════════════════════════════════════════════
    #[error(transparent)]
    Attestation(#[from] AttestationError),

    #[error("caller {caller} is not the attested worker {worker}")]
    WorkerMismatch { caller: Address, worker: Address },

    #[error("reliability score {score} below issuance minimum {min}")]
    ReliabilityTooLow { score: u8, min: u8 },

    #[error("pledged hours {hours} exceed issuance maximum {max}")]
    TooManyHours { hours: u64, max: u64 },

    #[error("token value {value} exceeds valuation ceiling {ceiling}")]
    ValueAboveCeiling { value: u128, ceiling: u128 },

    #[error("attested token value is zero")]
    ZeroValue,

    #[error(transparent)]
    Valuation(#[from] ValuationError),

    #[error(transparent)]
    Staking(#[from] StakingError),

    // ═══════════════════════════════════════════════════════════════════════════
    // TRANSFERS
    // ═══════════════════════════════════════════════════════════════════════════
    #[error("insufficient balance for {account}: have {balance}, need {needed}")]
    InsufficientBalance {
        account: Address,
        balance: u128,
        needed: u128,
    },

    #[error("insufficient allowance from {owner} to {spender}: have {allowance}, need {needed}")]
    InsufficientAllowance {
        owner: Address,
        spender: Address,
        allowance: u128,
        needed: u128,
    },

    #[error("transfer to the zero address")]
    ZeroRecipient,

    #[error("account {0} is held by the ledger")]
    ReservedAccount(Address),

    // ═══════════════════════════════════════════════════════════════════════════
    // ECHO YIELD
    // ═══════════════════════════════════════════════════════════════════════════
    #[error("unknown echo {0}")]
    UnknownEcho(u64),

    #[error("no pending yield for {0}")]
    NoPendingYield(Address),

    #[error("zero amount")]
    ZeroAmount,

    #[error("ledger overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Access(#[from] CommonError),
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::Attestation(err) => err.kind(),
            LedgerError::Valuation(err) => err.kind(),
            LedgerError::Staking(err) => err.kind(),
            LedgerError::Access(err) => err.kind(),
            LedgerError::WorkerMismatch { .. } | LedgerError::ReservedAccount(_) => {
                ErrorKind::Unauthorized
            }
            LedgerError::InsufficientBalance { .. }
            | LedgerError::InsufficientAllowance { .. }
            | LedgerError::NoPendingYield(_) => ErrorKind::InsufficientBalance,
            LedgerError::ReliabilityTooLow { .. }
            | LedgerError::TooManyHours { .. }
            | LedgerError::ValueAboveCeiling { .. }
            | LedgerError::ZeroValue
            | LedgerError::ZeroRecipient
            | LedgerError::UnknownEcho(_)
            | LedgerError::ZeroAmount
            | LedgerError::Overflow(_) => ErrorKind::Validation,
        }
    }
}
