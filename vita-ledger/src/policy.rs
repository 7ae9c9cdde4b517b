//! Issuance limits applied to every attested mint.

use serde::{Deserialize, Serialize};
use vita_attestation::Attestation;
use vita_common::ValuationConfig;
use vita_valuation::{reliability_to_fixed, ValuationEngine};

use crate::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuancePolicy {
    pub min_reliability_score: u8,
    pub max_pledged_hours: u64,
    /// Cap `tokenValue` at the undiscounted valuation of the pledge.
    pub enforce_value_ceiling: bool,
}

impl Default for IssuancePolicy {
    fn default() -> Self {
        Self::from(&ValuationConfig::default())
    }
}

impl From<&ValuationConfig> for IssuancePolicy {
    fn from(config: &ValuationConfig) -> Self {
        Self {
            min_reliability_score: config.min_reliability_score,
            max_pledged_hours: config.max_pledged_hours,
            enforce_value_ceiling: config.enforce_value_ceiling,
        }
    }
}

impl IssuancePolicy {
    /// Read-only checks; nothing is mutated.
    pub fn check(
        &self,
        attestation: &Attestation,
        valuation: &ValuationEngine,
    ) -> Result<(), LedgerError> {
        attestation.validate_scales()?;
        if attestation.token_value == 0 {
            return Err(LedgerError::ZeroValue);
        }
        valuation.skill_rate(attestation.skill_category)?;

        if attestation.reliability_score < self.min_reliability_score {
            return Err(LedgerError::ReliabilityTooLow {
                score: attestation.reliability_score,
                min: self.min_reliability_score,
            });
        }
        if attestation.pledged_hours > self.max_pledged_hours {
            return Err(LedgerError::TooManyHours {
                hours: attestation.pledged_hours,
                max: self.max_pledged_hours,
            });
        }

        if self.enforce_value_ceiling {
            let ceiling = valuation.calculate_value(
                attestation.skill_category,
                attestation.pledged_hours,
                reliability_to_fixed(attestation.reliability_score)?,
                0,
            )?;
            if attestation.token_value > ceiling {
                return Err(LedgerError::ValueAboveCeiling {
                    value: attestation.token_value,
                    ceiling,
                });
            }
        }
        Ok(())
    }
}
