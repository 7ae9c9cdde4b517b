//! Skill categories and the admin-managed hourly rate table.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use vita_common::{AdminChange, Caller, Role, PRECISION};

use crate::ValuationError;

/// Number of skill categories.
pub const SKILL_COUNT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum SkillCategory {
    SolidityDev = 0,
    FrontendDev = 1,
    BackendDev = 2,
    FullstackDev = 3,
    Devops = 4,
    DataScience = 5,
    AiMl = 6,
    Design = 7,
    Writing = 8,
    Marketing = 9,
}

impl SkillCategory {
    pub const ALL: [SkillCategory; SKILL_COUNT] = [
        SkillCategory::SolidityDev,
        SkillCategory::FrontendDev,
        SkillCategory::BackendDev,
        SkillCategory::FullstackDev,
        SkillCategory::Devops,
        SkillCategory::DataScience,
        SkillCategory::AiMl,
        SkillCategory::Design,
        SkillCategory::Writing,
        SkillCategory::Marketing,
    ];

    pub fn index(self) -> u8 {
        self as u8
    }

    /// Launch rate in whole USD per hour.
    pub fn default_rate_usd(self) -> u128 {
        match self {
            SkillCategory::SolidityDev => 150,
            SkillCategory::FrontendDev => 100,
            SkillCategory::BackendDev => 120,
            SkillCategory::FullstackDev => 130,
            SkillCategory::Devops => 110,
            SkillCategory::DataScience => 140,
            SkillCategory::AiMl => 160,
            SkillCategory::Design => 90,
            SkillCategory::Writing => 60,
            SkillCategory::Marketing => 70,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SkillCategory::SolidityDev => "SOLIDITY_DEV",
            SkillCategory::FrontendDev => "FRONTEND_DEV",
            SkillCategory::BackendDev => "BACKEND_DEV",
            SkillCategory::FullstackDev => "FULLSTACK_DEV",
            SkillCategory::Devops => "DEVOPS",
            SkillCategory::DataScience => "DATA_SCIENCE",
            SkillCategory::AiMl => "AI_ML",
            SkillCategory::Design => "DESIGN",
            SkillCategory::Writing => "WRITING",
            SkillCategory::Marketing => "MARKETING",
        }
    }
}

impl TryFrom<u8> for SkillCategory {
    type Error = ValuationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        SkillCategory::ALL
            .get(usize::from(value))
            .copied()
            .ok_or(ValuationError::UnknownSkillCategory(value))
    }
}

impl fmt::Display for SkillCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkillCategory {
    type Err = ValuationError;

    /// Accepts `SOLIDITY_DEV`, `solidity-dev` or the numeric index.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Ok(index) = s.parse::<u8>() {
            return SkillCategory::try_from(index);
        }
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        SkillCategory::ALL
            .into_iter()
            .find(|c| c.as_str() == normalized)
            .ok_or_else(|| ValuationError::UnknownSkillName(s.to_string()))
    }
}

/// USD/hour rate per category, 18-decimal fixed point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillRateTable {
    rates: [u128; SKILL_COUNT],
}

impl Default for SkillRateTable {
    fn default() -> Self {
        let mut rates = [0u128; SKILL_COUNT];
        for category in SkillCategory::ALL {
            rates[usize::from(category.index())] = category.default_rate_usd() * PRECISION;
        }
        Self { rates }
    }
}

impl SkillRateTable {
    pub fn rate(&self, category: SkillCategory) -> u128 {
        self.rates[usize::from(category.index())]
    }

    /// Replace one rate. Values already minted are unaffected.
    pub fn set_rate(
        &mut self,
        caller: &Caller,
        category: SkillCategory,
        rate: u128,
    ) -> Result<AdminChange, ValuationError> {
        caller.require(Role::Admin)?;
        if rate == 0 {
            return Err(ValuationError::ZeroRate);
        }
        let slot = &mut self.rates[usize::from(category.index())];
        let before = *slot;
        *slot = rate;
        Ok(AdminChange::SkillRate {
            category: category.index(),
            before,
            after: rate,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (SkillCategory, u128)> + '_ {
        SkillCategory::ALL.into_iter().map(|c| (c, self.rate(c)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vita_common::Address;

    #[test]
    fn default_rates() {
        let table = SkillRateTable::default();
        assert_eq!(table.rate(SkillCategory::SolidityDev), 150 * PRECISION);
        assert_eq!(table.rate(SkillCategory::AiMl), 160 * PRECISION);
        assert_eq!(table.rate(SkillCategory::Writing), 60 * PRECISION);
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert_eq!(
            SkillCategory::try_from(10),
            Err(ValuationError::UnknownSkillCategory(10))
        );
    }

    #[test]
    fn parses_names_and_indices() {
        assert_eq!("solidity-dev".parse::<SkillCategory>().unwrap(), SkillCategory::SolidityDev);
        assert_eq!("AI_ML".parse::<SkillCategory>().unwrap(), SkillCategory::AiMl);
        assert_eq!("9".parse::<SkillCategory>().unwrap(), SkillCategory::Marketing);
        assert!("plumbing".parse::<SkillCategory>().is_err());
    }

    #[test]
    fn set_rate_is_admin_only_and_audited() {
        let mut table = SkillRateTable::default();
        let outsider = Caller::unprivileged(Address([1; 20]));
        assert!(table
            .set_rate(&outsider, SkillCategory::SolidityDev, 200 * PRECISION)
            .is_err());

        let admin = Caller::new(Address([2; 20]), [Role::Admin]);
        let change = table
            .set_rate(&admin, SkillCategory::SolidityDev, 200 * PRECISION)
            .unwrap();
        assert_eq!(
            change,
            AdminChange::SkillRate {
                category: 0,
                before: 150 * PRECISION,
                after: 200 * PRECISION
            }
        );
        assert_eq!(table.rate(SkillCategory::SolidityDev), 200 * PRECISION);
        assert_eq!(
            table.set_rate(&admin, SkillCategory::Design, 0),
            Err(ValuationError::ZeroRate)
        );
    }
}
