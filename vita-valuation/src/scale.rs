//! Conversions between oracle score scales and 18-decimal fixed point.
//!
//! Attestations carry vitality on 0–1000 and reliability on 0–100. The
//! valuation formula wants reliability as a fraction in `[0, 1]`:
//!
//! | input | scale | fixed-point factor |
//! |---|---|---|
//! | reliability | 0–100 | × 1e16 |
//! | vitality | 0–1000 | × 1e15 |
//! | legacy vitality percent | 0–100 | × 10 into 0–1000 |

use vita_common::PRECISION;

use crate::ValuationError;

/// Seconds in the 365-day valuation year.
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

const RELIABILITY_UNIT: u128 = PRECISION / 100;
const VITALITY_UNIT: u128 = PRECISION / 1000;

pub fn reliability_to_fixed(score: u8) -> Result<u128, ValuationError> {
    if score > 100 {
        return Err(ValuationError::ReliabilityOutOfRange(format!("{score} > 100")));
    }
    Ok(u128::from(score) * RELIABILITY_UNIT)
}

pub fn vitality_to_fixed(score: u16) -> Result<u128, ValuationError> {
    if score > 1000 {
        return Err(ValuationError::VitalityOutOfRange(score));
    }
    Ok(u128::from(score) * VITALITY_UNIT)
}

/// Map a 0–100 vitality percentage onto the 0–1000 attestation scale.
pub fn vitality_from_percent(percent: u8) -> Result<u16, ValuationError> {
    if percent > 100 {
        return Err(ValuationError::VitalityOutOfRange(u16::from(percent)));
    }
    Ok(u16::from(percent) * 10)
}

/// Whole seconds to fixed-point years.
pub fn years_from_secs(secs: u64) -> u128 {
    u128::from(secs) * PRECISION / u128::from(SECONDS_PER_YEAR)
}
