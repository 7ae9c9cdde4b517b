//! vita-valuation
//!
//! Deterministic pricing of pledged work:
//!
//! ```text
//! V = (H × R(skill)) × S × e^{-λt}
//! ```
//!
//! `H` pledged hours, `R` the USD/hour rate for the skill, `S` the
//! reliability score in `[0, 1]`, `λ` the yearly decay constant and `t` the
//! years until fulfillment. Every quantity except `H` is 18-decimal fixed
//! point.

use serde::{Deserialize, Serialize};
use tracing::debug;
use vita_common::{mul_div, AdminChange, Caller, ValuationConfig, PRECISION};

pub mod decay;
pub mod error;
pub mod scale;
pub mod skills;

pub use decay::{exp_neg, MAX_DECAY_EXPONENT};
pub use error::ValuationError;
pub use scale::{
    reliability_to_fixed, vitality_from_percent, vitality_to_fixed, years_from_secs,
    SECONDS_PER_YEAR,
};
pub use skills::{SkillCategory, SkillRateTable, SKILL_COUNT};

/// Every intermediate of one valuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationBreakdown {
    /// `H × R`.
    #[serde(with = "vita_common::u128_string")]
    pub base_value: u128,
    /// `base × S`.
    #[serde(with = "vita_common::u128_string")]
    pub adjusted_value: u128,
    /// `e^{-λt}`.
    #[serde(with = "vita_common::u128_string")]
    pub time_decay: u128,
    /// `adjusted × decay`.
    #[serde(with = "vita_common::u128_string")]
    pub final_value: u128,
}

#[derive(Debug, Clone)]
pub struct ValuationEngine {
    rates: SkillRateTable,
    decay_lambda: u128,
}

impl Default for ValuationEngine {
    fn default() -> Self {
        Self::new(ValuationConfig::default().decay_lambda)
    }
}

impl ValuationEngine {
    pub fn new(decay_lambda: u128) -> Self {
        Self {
            rates: SkillRateTable::default(),
            decay_lambda,
        }
    }

    pub fn from_config(config: &ValuationConfig) -> Self {
        Self::new(config.decay_lambda)
    }

    pub fn decay_lambda(&self) -> u128 {
        self.decay_lambda
    }

    pub fn rates(&self) -> &SkillRateTable {
        &self.rates
    }

    pub fn skill_rate(&self, skill_category: u8) -> Result<u128, ValuationError> {
        Ok(self.rates.rate(SkillCategory::try_from(skill_category)?))
    }

    pub fn set_skill_rate(
        &mut self,
        caller: &Caller,
        skill_category: u8,
        rate: u128,
    ) -> Result<AdminChange, ValuationError> {
        let category = SkillCategory::try_from(skill_category)?;
        self.rates.set_rate(caller, category, rate)
    }

    /// `e^{-λt}` for fixed-point years `t`.
    pub fn time_decay(&self, elapsed_years: u128) -> Result<u128, ValuationError> {
        let exponent = mul_div(self.decay_lambda, elapsed_years, PRECISION)
            .ok_or(ValuationError::Overflow("decay exponent"))?;
        if exponent > MAX_DECAY_EXPONENT {
            return Err(ValuationError::ElapsedTimeTooLarge {
                exponent,
                max: MAX_DECAY_EXPONENT,
            });
        }
        Ok(exp_neg(exponent))
    }

    /// Token value for a pledge.
    ///
    /// `reliability` is fixed point in `[0, 1]`; `elapsed_years` is fixed
    /// point. Zero hours values to zero.
    pub fn calculate_value(
        &self,
        skill_category: u8,
        pledged_hours: u64,
        reliability: u128,
        elapsed_years: u128,
    ) -> Result<u128, ValuationError> {
        Ok(self
            .calculate_value_detailed(skill_category, pledged_hours, reliability, elapsed_years)?
            .final_value)
    }

    pub fn calculate_value_detailed(
        &self,
        skill_category: u8,
        pledged_hours: u64,
        reliability: u128,
        elapsed_years: u128,
    ) -> Result<ValuationBreakdown, ValuationError> {
        let rate = self.skill_rate(skill_category)?;
        if reliability > PRECISION {
            return Err(ValuationError::ReliabilityOutOfRange(format!(
                "{reliability} exceeds 1.0"
            )));
        }
        let time_decay = self.time_decay(elapsed_years)?;

        let base_value = rate
            .checked_mul(u128::from(pledged_hours))
            .ok_or(ValuationError::Overflow("base value"))?;
        let adjusted_value = mul_div(base_value, reliability, PRECISION)
            .ok_or(ValuationError::Overflow("adjusted value"))?;
        let final_value = mul_div(adjusted_value, time_decay, PRECISION)
            .ok_or(ValuationError::Overflow("final value"))?;

        debug!(
            skill_category,
            pledged_hours,
            base_value,
            final_value,
            "valuation computed"
        );
        Ok(ValuationBreakdown {
            base_value,
            adjusted_value,
            time_decay,
            final_value,
        })
    }
}
