//! In-memory end-to-end scenario.
//!
//! Keys for the oracle, admin and worker are derived from `--seed`, so two
//! runs with the same seed and configuration produce the same addresses and
//! signatures.

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;
use vita_attestation::{Attestation, Eip712Domain, OracleSigner};
use vita_common::{format_fixed, to_fixed, Address, ProtocolConfig};
use vita_ledger::{MintReceipt, TOKEN_SYMBOL};
use vita_proof_registry::{Groth16Proof, PublicSignals, StructuralVerifier, WorkProofRecord};
use vita_protocol::{Protocol, ProtocolSummary};
use vita_staking::{SimulatedWrappedAsset, YieldClaim};
use vita_valuation::{reliability_to_fixed, SkillCategory, ValuationEngine};

use crate::{current_unix_timestamp, output_summary};

const KEY_CONTEXT: &str = "vita-tools 2024-06 simulate signer";
const DEFAULT_LEDGER: &str = "0x5fbdb2315678afecb367f032d93f642f64180aa3";
const ATTESTATION_TTL_SECS: u64 = 86_400;

#[derive(Args, Clone, Debug)]
pub struct SimulateArgs {
    /// Seed for the derived oracle, admin and worker keys.
    #[arg(long, default_value = "vita")]
    pub seed: String,
    /// Ledger identity used when the configuration leaves it unset.
    #[arg(long, default_value = DEFAULT_LEDGER)]
    pub ledger: Address,
    #[arg(long, default_value = "SOLIDITY_DEV")]
    pub skill: SkillCategory,
    #[arg(long, default_value_t = 160)]
    pub hours: u64,
    #[arg(long, default_value_t = 100)]
    pub reliability: u8,
    #[arg(long, default_value_t = 850)]
    pub vitality: u16,
    /// Whole units staked alongside the mint.
    #[arg(long, default_value_t = 10)]
    pub collateral: u128,
    /// Exchange-rate increase applied before claiming, in basis points.
    #[arg(long, default_value_t = 1000)]
    pub yield_bps: u16,
    /// Whole units of echo yield sent to the minted echo.
    #[arg(long, default_value_t = 1)]
    pub echo_yield: u128,
    /// snarkjs proof JSON to admit after minting (requires --signals).
    #[arg(long, requires = "signals")]
    pub proof: Option<PathBuf>,
    /// JSON array of the seven public signals as decimal strings.
    #[arg(long, requires = "proof")]
    pub signals: Option<PathBuf>,
    #[arg(long)]
    pub json: bool,
}

impl Default for SimulateArgs {
    fn default() -> Self {
        Self {
            seed: "vita".into(),
            ledger: DEFAULT_LEDGER.parse().unwrap_or(Address::ZERO),
            skill: SkillCategory::SolidityDev,
            hours: 160,
            reliability: 100,
            vitality: 850,
            collateral: 10,
            yield_bps: 1000,
            echo_yield: 1,
            proof: None,
            signals: None,
            json: false,
        }
    }
}

pub fn run(mut config: ProtocolConfig, args: SimulateArgs) -> Result<()> {
    if config.domain.verifying_contract.is_zero() {
        config.domain.verifying_contract = args.ledger;
    }
    let oracle = derive_signer(&args.seed, "oracle")?;
    let admin = derive_signer(&args.seed, "admin")?.address();
    let worker = derive_signer(&args.seed, "worker")?.address();
    let now = current_unix_timestamp();

    let engine = ValuationEngine::from_config(&config.valuation);
    let attestation = build_attestation(&engine, &args, worker, now)?;
    let signature = oracle.sign_attestation(&Eip712Domain::from(&config.domain), &attestation)?;

    let asset = SimulatedWrappedAsset::new();
    let protocol = Protocol::new(
        config,
        admin,
        [oracle.address()],
        asset.clone(),
        Box::new(StructuralVerifier),
    )?;

    let collateral = to_fixed(args.collateral).context("collateral overflows")?;
    let mint = protocol.mint_echo(worker, &attestation, &signature, collateral, now)?;
    info!(worker = %worker, echo_id = mint.echo_id, value = mint.token_value, "simulated mint");

    let claim = if collateral > 0 && args.yield_bps > 0 {
        asset.simulate_yield(args.yield_bps)?;
        if protocol.pending_yield(&worker)? > 0 {
            Some(protocol.claim_yield(worker, now)?)
        } else {
            None
        }
    } else {
        None
    };

    let echo_yield = to_fixed(args.echo_yield).context("echo yield overflows")?;
    let echo_yield_claimed = if echo_yield > 0 {
        // The admin funds the echo yield out of tokens the worker sends over.
        protocol.transfer(worker, admin, echo_yield)?;
        protocol.distribute_yield(admin, mint.echo_id, echo_yield)?;
        if protocol.pending_worker_yield(&worker)? > 0 {
            protocol.claim_worker_yield(worker)?
        } else {
            0
        }
    } else {
        0
    };

    let proof = match (&args.proof, &args.signals) {
        (Some(proof_path), Some(signals_path)) => {
            let (proof, signals) = load_submission(proof_path, signals_path)?;
            Some(protocol.submit_work_proof(worker, &proof, &signals, now)?)
        }
        (None, None) => None,
        _ => bail!("--proof and --signals must be given together"),
    };

    let summary = SimulationSummary {
        oracle: oracle.address(),
        admin,
        worker,
        mint,
        claim,
        echo_yield_claimed,
        proof,
        protocol: protocol.summary()?,
    };
    output_summary(&summary, args.json)
}

/// Attestation priced at issuance time (no decay) for the scenario worker.
pub fn build_attestation(
    engine: &ValuationEngine,
    args: &SimulateArgs,
    worker: Address,
    now: u64,
) -> Result<Attestation> {
    let token_value = engine.calculate_value(
        args.skill.index(),
        args.hours,
        reliability_to_fixed(args.reliability)?,
        0,
    )?;
    Ok(Attestation {
        worker,
        external_username: format!("simulated-{}", args.seed),
        vitality_score: args.vitality,
        reliability_score: args.reliability,
        pledged_hours: args.hours,
        skill_category: args.skill.index(),
        token_value,
        valid_until: now + ATTESTATION_TTL_SECS,
        nonce: 1,
    })
}

fn derive_signer(seed: &str, role: &str) -> Result<OracleSigner> {
    let secret = blake3::derive_key(KEY_CONTEXT, format!("{seed}/{role}").as_bytes());
    OracleSigner::from_slice(&secret).with_context(|| format!("derived {role} key is invalid"))
}

fn load_submission(proof: &Path, signals: &Path) -> Result<(Groth16Proof, PublicSignals)> {
    let raw = fs::read_to_string(proof)
        .with_context(|| format!("failed to read {}", proof.display()))?;
    let proof = Groth16Proof::from_snarkjs_json(&raw)?;

    let raw = fs::read_to_string(signals)
        .with_context(|| format!("failed to read {}", signals.display()))?;
    let values: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse signals {}", signals.display()))?;
    Ok((proof, PublicSignals::from_decimal(&values)?))
}

#[derive(Serialize)]
struct SimulationSummary {
    oracle: Address,
    admin: Address,
    worker: Address,
    mint: MintReceipt,
    claim: Option<YieldClaim>,
    #[serde(with = "vita_common::u128_string")]
    echo_yield_claimed: u128,
    proof: Option<WorkProofRecord>,
    protocol: ProtocolSummary,
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "oracle: {}", self.oracle)?;
        writeln!(f, "worker: {}", self.worker)?;
        writeln!(
            f,
            "minted: {} {} (echo #{})",
            format_fixed(self.mint.token_value),
            TOKEN_SYMBOL,
            self.mint.echo_id
        )?;
        if let Some(stake) = &self.mint.stake {
            writeln!(
                f,
                "staked: {} at rate {}",
                format_fixed(stake.deposited),
                format_fixed(stake.rate)
            )?;
        }
        match &self.claim {
            Some(claim) => writeln!(
                f,
                "yield claimed: {} (worker {}, holders {}, protocol {})",
                format_fixed(claim.realized),
                format_fixed(claim.shares.worker),
                format_fixed(claim.shares.holders),
                format_fixed(claim.shares.protocol)
            )?,
            None => writeln!(f, "yield claimed: none")?,
        }
        writeln!(f, "echo yield claimed: {}", format_fixed(self.echo_yield_claimed))?;
        if let Some(proof) = &self.proof {
            writeln!(
                f,
                "proof admitted: quality {} fingerprint {}",
                proof.quality_score, proof.fingerprint
            )?;
        }
        let p = &self.protocol;
        writeln!(f, "total supply: {}", format_fixed(p.total_supply))?;
        writeln!(f, "total staked: {}", format_fixed(p.total_staked))?;
        writeln!(f, "exchange rate: {}", format_fixed(p.exchange_rate))?;
        writeln!(f, "treasury: {}", format_fixed(p.treasury_balance))?;
        writeln!(f, "holder pool: {}", format_fixed(p.holder_pool_balance))?;
        writeln!(f, "echo holder pool: {}", format_fixed(p.echo_holder_pool))?;
        writeln!(f, "proofs: {}", p.total_proofs)?;
        writeln!(f, "audit records: {}", p.audit_records)
    }
}
