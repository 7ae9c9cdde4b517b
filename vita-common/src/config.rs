//! Protocol configuration.
//!
//! Defaults reproduce the deployed protocol parameters. A JSON file named by
//! `VITA_CONFIG` can replace them, and individual `VITA_*` environment
//! variables override single fields on top of that.

use std::{env, fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::{fixed::BPS_DENOMINATOR, Address};

// ═══════════════════════════════════════════════════════════════════════════════
// MAIN CONFIGURATION
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolConfig {
    /// Typed-data signing domain.
    #[serde(default)]
    pub domain: DomainConfig,

    /// Valuation and issuance policy.
    #[serde(default)]
    pub valuation: ValuationConfig,

    /// Collateral yield split.
    #[serde(default)]
    pub staking: StakingConfig,

    /// Work-proof admission.
    #[serde(default)]
    pub proofs: ProofConfig,
}

impl ProtocolConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from the environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = match env::var("VITA_CONFIG") {
            Ok(path) => Self::from_json_file(path)?,
            Err(_) => Self::default(),
        };

        if let Ok(chain_id) = env::var("VITA_CHAIN_ID") {
            config.domain.chain_id = chain_id
                .parse()
                .with_context(|| format!("VITA_CHAIN_ID is not a number: {chain_id}"))?;
        }
        if let Ok(contract) = env::var("VITA_VERIFYING_CONTRACT") {
            config.domain.verifying_contract = contract
                .parse()
                .context("VITA_VERIFYING_CONTRACT is not an address")?;
        }
        if let Some(score) = parse_env("VITA_MIN_QUALITY_SCORE")? {
            config.proofs.min_quality_score = score;
        }
        if let Some(bps) = parse_env("VITA_WORKER_SHARE_BPS")? {
            config.staking.split.worker_bps = bps;
        }
        if let Some(bps) = parse_env("VITA_HOLDER_SHARE_BPS")? {
            config.staking.split.holder_bps = bps;
        }
        if let Some(bps) = parse_env("VITA_PROTOCOL_SHARE_BPS")? {
            config.staking.split.protocol_bps = bps;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.staking.split.validate()?;
        ensure!(self.valuation.decay_lambda > 0, "decay_lambda must be positive");
        ensure!(
            self.valuation.min_reliability_score <= 100,
            "min_reliability_score must be within 0..=100"
        );
        ensure!(!self.domain.name.is_empty(), "domain name must not be empty");
        Ok(())
    }
}

fn parse_env<T>(key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| anyhow::anyhow!("{key}={raw}: {e}")),
        Err(_) => Ok(None),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SECTIONS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default = "default_domain_name")]
    pub name: String,
    #[serde(default = "default_domain_version")]
    pub version: String,
    /// Mantle Sepolia by default.
    #[serde(default = "default_chain_id")]
    pub chain_id: u64,
    /// Identity of the ledger: the EIP-712 verifying contract and the holder
    /// of the stake-credit role.
    #[serde(default)]
    pub verifying_contract: Address,
}

fn default_domain_name() -> String {
    "VITA Protocol".to_string()
}

fn default_domain_version() -> String {
    "1".to_string()
}

fn default_chain_id() -> u64 {
    5003
}

impl Default for DomainConfig {
    fn default() -> Self {
        Self {
            name: default_domain_name(),
            version: default_domain_version(),
            chain_id: default_chain_id(),
            verifying_contract: Address::ZERO,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValuationConfig {
    /// Decay constant per year, 18-decimal fixed point (0.1 by default).
    #[serde(default = "default_decay_lambda", with = "crate::u128_string")]
    pub decay_lambda: u128,
    /// Minimum reliability score (0..=100) accepted for issuance.
    #[serde(default = "default_min_reliability")]
    pub min_reliability_score: u8,
    /// Maximum pledged hours per attestation.
    #[serde(default = "default_max_pledged_hours")]
    pub max_pledged_hours: u64,
    /// Reject attestations whose token value exceeds the undiscounted
    /// valuation at the current rate table.
    #[serde(default = "default_true")]
    pub enforce_value_ceiling: bool,
}

fn default_decay_lambda() -> u128 {
    100_000_000_000_000_000
}

fn default_min_reliability() -> u8 {
    50
}

fn default_max_pledged_hours() -> u64 {
    1000
}

fn default_true() -> bool {
    true
}

impl Default for ValuationConfig {
    fn default() -> Self {
        Self {
            decay_lambda: default_decay_lambda(),
            min_reliability_score: default_min_reliability(),
            max_pledged_hours: default_max_pledged_hours(),
            enforce_value_ceiling: true,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StakingConfig {
    #[serde(default)]
    pub split: YieldSplit,
}

/// Basis-point split of realized collateral yield.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldSplit {
    pub worker_bps: u16,
    pub holder_bps: u16,
    pub protocol_bps: u16,
}

impl Default for YieldSplit {
    fn default() -> Self {
        Self {
            worker_bps: 2000,
            holder_bps: 7000,
            protocol_bps: 1000,
        }
    }
}

impl YieldSplit {
    pub fn validate(&self) -> Result<()> {
        let total = u128::from(self.worker_bps)
            + u128::from(self.holder_bps)
            + u128::from(self.protocol_bps);
        ensure!(
            total == BPS_DENOMINATOR,
            "yield split must sum to {BPS_DENOMINATOR} bps, got {total}"
        );
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProofConfig {
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: u64,
}

fn default_min_quality_score() -> u64 {
    50
}

impl Default for ProofConfig {
    fn default() -> Self {
        Self {
            min_quality_score: default_min_quality_score(),
        }
    }
}
