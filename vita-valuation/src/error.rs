//! Error types for the valuation engine.

use thiserror::Error;
use vita_common::{CommonError, ErrorKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValuationError {
    #[error("unknown skill category: {0}")]
    UnknownSkillCategory(u8),

    #[error("unknown skill name: {0}")]
    UnknownSkillName(String),

    #[error("reliability score out of range: {0}")]
    ReliabilityOutOfRange(String),

    #[error("vitality score out of range: {0}")]
    VitalityOutOfRange(u16),

    #[error("skill rate must be positive")]
    ZeroRate,

    #[error("elapsed time too large: decay exponent {exponent} exceeds {max}")]
    ElapsedTimeTooLarge { exponent: u128, max: u128 },

    #[error("valuation overflow in {0}")]
    Overflow(&'static str),

    #[error(transparent)]
    Access(#[from] CommonError),
}

impl ValuationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValuationError::Access(err) => err.kind(),
            _ => ErrorKind::Validation,
        }
    }
}
