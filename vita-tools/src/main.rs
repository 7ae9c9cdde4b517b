//! vita: operator CLI for the VITA protocol.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use vita_attestation::{
    recover_signer, struct_hash, typed_data_digest, Attestation, AttestationSignature,
    Eip712Domain, OracleSigner,
};
use vita_common::{format_fixed, Address, ProtocolConfig};
use vita_valuation::{
    reliability_to_fixed, years_from_secs, SkillCategory, ValuationBreakdown, ValuationEngine,
};

mod simulate;

const ORACLE_KEY_VAR: &str = "VITA_ORACLE_KEY";

#[derive(Parser)]
#[command(name = "vita", about = "Operator commands for the VITA protocol")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Price a pledge with the configured rate table and decay.
    Valuate(ValuateArgs),
    /// Print the domain separator, struct hash and signing digest of an attestation.
    Digest(AttestationArgs),
    /// Sign an attestation with the key in VITA_ORACLE_KEY.
    Sign(AttestationArgs),
    /// Recover the signer of an attestation signature.
    Recover(RecoverArgs),
    /// Run a mint, stake, yield and claim scenario against in-memory state.
    Simulate(simulate::SimulateArgs),
    /// Print the effective configuration.
    Config(OutputArgs),
}

#[derive(Args)]
struct OutputArgs {
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ValuateArgs {
    /// Skill category name (SOLIDITY_DEV, ai-ml, ...) or index.
    #[arg(long, default_value = "SOLIDITY_DEV")]
    skill: SkillCategory,
    #[arg(long)]
    hours: u64,
    /// Reliability score, 0..=100.
    #[arg(long, default_value_t = 100)]
    reliability: u8,
    /// Seconds elapsed since the pledge.
    #[arg(long, default_value_t = 0)]
    elapsed_secs: u64,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AttestationArgs {
    /// Attestation JSON file.
    #[arg(long)]
    attestation: PathBuf,
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct RecoverArgs {
    #[arg(long)]
    attestation: PathBuf,
    /// 65-byte r || s || v signature, hex.
    #[arg(long)]
    signature: String,
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vita=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = ProtocolConfig::from_env().context("failed to load configuration")?;
    match cli.command {
        Commands::Valuate(args) => valuate(&config, args),
        Commands::Digest(args) => digest(&config, args),
        Commands::Sign(args) => sign(&config, args),
        Commands::Recover(args) => recover(&config, args),
        Commands::Simulate(args) => simulate::run(config, args),
        Commands::Config(args) => output_summary(&ConfigSummary(config), args.json),
    }
}

fn valuate(config: &ProtocolConfig, args: ValuateArgs) -> Result<()> {
    let engine = ValuationEngine::from_config(&config.valuation);
    let breakdown = engine.calculate_value_detailed(
        args.skill.index(),
        args.hours,
        reliability_to_fixed(args.reliability)?,
        years_from_secs(args.elapsed_secs),
    )?;
    let summary = ValuationSummary {
        skill: args.skill,
        hourly_rate: engine.skill_rate(args.skill.index())?,
        hours: args.hours,
        reliability: args.reliability,
        elapsed_secs: args.elapsed_secs,
        breakdown,
    };
    output_summary(&summary, args.json)
}

fn digest(config: &ProtocolConfig, args: AttestationArgs) -> Result<()> {
    let attestation = load_attestation(&args.attestation)?;
    let domain = Eip712Domain::from(&config.domain);
    let summary = DigestSummary {
        domain_separator: hex_word(&domain.separator()),
        struct_hash: hex_word(&struct_hash(&attestation)),
        digest: hex_word(&typed_data_digest(&domain, &attestation)),
        domain,
    };
    output_summary(&summary, args.json)
}

fn sign(config: &ProtocolConfig, args: AttestationArgs) -> Result<()> {
    let attestation = load_attestation(&args.attestation)?;
    let key = std::env::var(ORACLE_KEY_VAR)
        .with_context(|| format!("{ORACLE_KEY_VAR} must hold the oracle secret key"))?;
    let signer = OracleSigner::from_hex(&key)?;
    let domain = Eip712Domain::from(&config.domain);
    let signature = signer.sign_attestation(&domain, &attestation)?;
    debug!(signer = %signer.address(), nonce = attestation.nonce, "attestation signed");

    let summary = SignatureSummary {
        signer: signer.address(),
        worker: attestation.worker,
        nonce: attestation.nonce.to_string(),
        digest: hex_word(&typed_data_digest(&domain, &attestation)),
        signature: signature.to_hex(),
    };
    output_summary(&summary, args.json)
}

fn recover(config: &ProtocolConfig, args: RecoverArgs) -> Result<()> {
    let attestation = load_attestation(&args.attestation)?;
    let signature = AttestationSignature::from_hex(&args.signature)?;
    let domain = Eip712Domain::from(&config.domain);
    let digest = typed_data_digest(&domain, &attestation);
    let signer = recover_signer(&digest, &signature)?;

    let summary = SignatureSummary {
        signer,
        worker: attestation.worker,
        nonce: attestation.nonce.to_string(),
        digest: hex_word(&digest),
        signature: signature.to_hex(),
    };
    output_summary(&summary, args.json)
}

fn load_attestation(path: &Path) -> Result<Attestation> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let attestation: Attestation = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse attestation {}", path.display()))?;
    if attestation.worker.is_zero() {
        bail!("attestation worker must not be the zero address");
    }
    Ok(attestation)
}

fn hex_word(word: &[u8; 32]) -> String {
    format!("0x{}", hex::encode(word))
}

pub(crate) fn current_unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub(crate) fn output_summary<T>(summary: &T, json: bool) -> Result<()>
where
    T: Serialize + fmt::Display,
{
    if json {
        println!("{}", serde_json::to_string_pretty(summary)?);
    } else {
        println!("{}", summary);
    }
    Ok(())
}

#[derive(Serialize)]
struct ValuationSummary {
    skill: SkillCategory,
    #[serde(with = "vita_common::u128_string")]
    hourly_rate: u128,
    hours: u64,
    reliability: u8,
    elapsed_secs: u64,
    #[serde(flatten)]
    breakdown: ValuationBreakdown,
}

impl fmt::Display for ValuationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "skill: {} ({} / hour)", self.skill, format_fixed(self.hourly_rate))?;
        writeln!(f, "hours: {}", self.hours)?;
        writeln!(f, "reliability: {}/100", self.reliability)?;
        writeln!(f, "elapsed: {} s", self.elapsed_secs)?;
        writeln!(f, "base value: {}", format_fixed(self.breakdown.base_value))?;
        writeln!(f, "adjusted value: {}", format_fixed(self.breakdown.adjusted_value))?;
        writeln!(f, "time decay: {}", format_fixed(self.breakdown.time_decay))?;
        writeln!(f, "final value: {}", format_fixed(self.breakdown.final_value))
    }
}

#[derive(Serialize)]
struct DigestSummary {
    domain: Eip712Domain,
    domain_separator: String,
    struct_hash: String,
    digest: String,
}

impl fmt::Display for DigestSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "domain: {} v{} chain {} contract {}",
            self.domain.name, self.domain.version, self.domain.chain_id, self.domain.verifying_contract
        )?;
        writeln!(f, "domain_separator: {}", self.domain_separator)?;
        writeln!(f, "struct_hash: {}", self.struct_hash)?;
        writeln!(f, "digest: {}", self.digest)
    }
}

#[derive(Serialize)]
struct SignatureSummary {
    signer: Address,
    worker: Address,
    nonce: String,
    digest: String,
    signature: String,
}

impl fmt::Display for SignatureSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "signer: {}", self.signer)?;
        writeln!(f, "worker: {}", self.worker)?;
        writeln!(f, "nonce: {}", self.nonce)?;
        writeln!(f, "digest: {}", self.digest)?;
        writeln!(f, "signature: {}", self.signature)
    }
}

#[derive(Serialize)]
#[serde(transparent)]
struct ConfigSummary(ProtocolConfig);

impl fmt::Display for ConfigSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = &self.0;
        writeln!(f, "domain: {} v{}", c.domain.name, c.domain.version)?;
        writeln!(f, "chain_id: {}", c.domain.chain_id)?;
        writeln!(f, "verifying_contract: {}", c.domain.verifying_contract)?;
        writeln!(f, "decay_lambda: {}", format_fixed(c.valuation.decay_lambda))?;
        writeln!(f, "min_reliability_score: {}", c.valuation.min_reliability_score)?;
        writeln!(f, "max_pledged_hours: {}", c.valuation.max_pledged_hours)?;
        writeln!(f, "enforce_value_ceiling: {}", c.valuation.enforce_value_ceiling)?;
        writeln!(
            f,
            "yield split (bps): worker {} / holders {} / protocol {}",
            c.staking.split.worker_bps, c.staking.split.holder_bps, c.staking.split.protocol_bps
        )?;
        writeln!(f, "min_quality_score: {}", c.proofs.min_quality_score)
    }
}
