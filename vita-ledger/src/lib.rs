//! vita-ledger
//!
//! The VITA token ledger. Tokens are only created by [`MintingLedger::mint_echo`],
//! which requires an oracle attestation signed under the ledger's EIP-712
//! domain. Each successful mint records an echo, updates the worker's profile
//! and can forward collateral to the staking pool in the same step.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use vita_attestation::{Attestation, AttestationRegistry, AttestationSignature};
use vita_common::{AdminChange, Address, Caller, Role, Timestamp};
use vita_staking::{StakeCreditor, StakeReceipt};
use vita_valuation::ValuationEngine;

pub mod echo;
pub mod error;
pub mod policy;
pub mod token;

pub use echo::{EchoRecord, YieldDistribution};
pub use error::LedgerError;
pub use policy::IssuancePolicy;

pub const TOKEN_NAME: &str = "VITA Token";
pub const TOKEN_SYMBOL: &str = "VITA";
pub const DECIMALS: u8 = 18;

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNTS
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerProfile {
    #[serde(rename = "githubUsername")]
    pub external_username: String,
    #[serde(with = "vita_common::u128_string")]
    pub total_minted: u128,
    pub last_mint_timestamp: Timestamp,
    /// 0–1000 scale.
    pub vitality_score: u16,
    pub is_verified: bool,
    pub proof_count: u64,
}

/// Balance, replay state and profile of one worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkerAccount {
    #[serde(with = "vita_common::u128_string")]
    pub balance: u128,
    pub nonce_high_watermark: Option<u128>,
    pub profile: WorkerProfile,
}

/// Collateral to stake for the worker as part of a mint.
pub struct Collateral<'a> {
    pub pool: &'a mut dyn StakeCreditor,
    /// The ledger identity resolved with its current roles.
    pub credentials: Caller,
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MintReceipt {
    pub worker: Address,
    pub echo_id: u64,
    #[serde(with = "vita_common::u128_string")]
    pub token_value: u128,
    #[serde(with = "vita_common::u128_string")]
    pub new_balance: u128,
    pub stake: Option<StakeReceipt>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct MintingLedger {
    identity: Address,
    attestations: AttestationRegistry,
    valuation: ValuationEngine,
    policy: IssuancePolicy,
    pub(crate) balances: HashMap<Address, u128>,
    pub(crate) allowances: HashMap<(Address, Address), u128>,
    pub(crate) total_supply: u128,
    pub(crate) profiles: HashMap<Address, WorkerProfile>,
    pub(crate) echoes: Vec<EchoRecord>,
    pub(crate) worker_yield_bps: u16,
    pub(crate) pending_worker_yield: HashMap<Address, u128>,
    pub(crate) holder_yield_pool: u128,
}

impl MintingLedger {
    /// `identity` is the ledger's own address: its EIP-712 verifying
    /// contract and the account that holds the stake-credit role.
    pub fn new(
        identity: Address,
        attestations: AttestationRegistry,
        valuation: ValuationEngine,
        policy: IssuancePolicy,
        worker_yield_bps: u16,
    ) -> Self {
        Self {
            identity,
            attestations,
            valuation,
            policy,
            balances: HashMap::new(),
            allowances: HashMap::new(),
            total_supply: 0,
            profiles: HashMap::new(),
            echoes: Vec::new(),
            worker_yield_bps,
            pending_worker_yield: HashMap::new(),
            holder_yield_pool: 0,
        }
    }

    /// Mint `attestation.token_value` to the calling worker.
    ///
    /// All checks (signature, caller, freshness, replay, issuance policy,
    /// arithmetic, collateral credit) complete before the nonce is consumed
    /// and balances change, so a failure leaves the ledger untouched.
    pub fn mint_echo(
        &mut self,
        caller: &Caller,
        attestation: &Attestation,
        signature: &AttestationSignature,
        collateral: Option<Collateral<'_>>,
        now: Timestamp,
    ) -> Result<MintReceipt, LedgerError> {
        let worker = attestation.worker;
        let result = self.prepare_mint(caller, attestation, signature, now);
        let (new_balance, new_supply, total_minted) = match result {
            Ok(values) => values,
            Err(err) => {
                warn!(worker = %worker, nonce = attestation.nonce, error = %err, "mint rejected");
                return Err(err);
            }
        };

        let stake = match collateral {
            Some(c) => Some(
                c.pool
                    .credit_stake(&c.credentials, worker, c.amount, now)
                    .inspect_err(|err| warn!(worker = %worker, error = %err, "collateral credit failed"))?,
            ),
            None => None,
        };

        // Commit.
        self.attestations.consume(worker, attestation.nonce);
        self.balances.insert(worker, new_balance);
        self.total_supply = new_supply;

        let profile = self.profiles.entry(worker).or_default();
        profile.external_username = attestation.external_username.clone();
        profile.total_minted = total_minted;
        profile.last_mint_timestamp = now;
        profile.vitality_score = attestation.vitality_score;
        profile.is_verified = true;

        let echo_id = self.echoes.len() as u64;
        self.echoes.push(EchoRecord {
            id: echo_id,
            worker,
            token_value: attestation.token_value,
            pledged_hours: attestation.pledged_hours,
            skill_category: attestation.skill_category,
            vitality_score: attestation.vitality_score,
            minted_at: now,
        });

        info!(
            worker = %worker,
            echo_id,
            token_value = attestation.token_value,
            vitality_score = attestation.vitality_score,
            new_balance,
            "VitaMinted"
        );
        Ok(MintReceipt {
            worker,
            echo_id,
            token_value: attestation.token_value,
            new_balance,
            stake,
        })
    }

    /// Every read-only mint precondition. Returns the post-mint balance,
    /// supply and profile total.
    fn prepare_mint(
        &self,
        caller: &Caller,
        attestation: &Attestation,
        signature: &AttestationSignature,
        now: Timestamp,
    ) -> Result<(u128, u128, u128), LedgerError> {
        self.attestations.verify_signer(attestation, signature)?;
        if attestation.worker != caller.address() {
            return Err(LedgerError::WorkerMismatch {
                caller: caller.address(),
                worker: attestation.worker,
            });
        }
        self.attestations.check(
            &attestation.worker,
            attestation.nonce,
            attestation.valid_until,
            now,
        )?;
        self.policy.check(attestation, &self.valuation)?;

        let value = attestation.token_value;
        let new_balance = self
            .balance_of(&attestation.worker)
            .checked_add(value)
            .ok_or(LedgerError::Overflow("balance"))?;
        let new_supply = self
            .total_supply
            .checked_add(value)
            .ok_or(LedgerError::Overflow("total supply"))?;
        let total_minted = self
            .profiles
            .get(&attestation.worker)
            .map(|p| p.total_minted)
            .unwrap_or(0)
            .checked_add(value)
            .ok_or(LedgerError::Overflow("total minted"))?;
        Ok((new_balance, new_supply, total_minted))
    }

    // === Admin ===

    pub fn add_oracle(&mut self, caller: &Caller, oracle: Address) -> Result<AdminChange, LedgerError> {
        Ok(self.attestations.add_oracle(caller, oracle)?)
    }

    pub fn remove_oracle(
        &mut self,
        caller: &Caller,
        oracle: Address,
    ) -> Result<AdminChange, LedgerError> {
        Ok(self.attestations.remove_oracle(caller, oracle)?)
    }

    pub fn set_skill_rate(
        &mut self,
        caller: &Caller,
        skill_category: u8,
        rate: u128,
    ) -> Result<AdminChange, LedgerError> {
        Ok(self.valuation.set_skill_rate(caller, skill_category, rate)?)
    }

    /// Mark a worker verified without a mint, creating the profile if needed.
    pub fn verify_worker(
        &mut self,
        caller: &Caller,
        worker: Address,
        external_username: &str,
    ) -> Result<AdminChange, LedgerError> {
        caller.require(Role::Admin)?;
        let profile = self.profiles.entry(worker).or_default();
        let before = profile.is_verified;
        profile.is_verified = true;
        profile.external_username = external_username.to_string();
        Ok(AdminChange::WorkerVerified {
            worker,
            before,
            after: true,
        })
    }

    /// Count an admitted work proof against the submitter's profile.
    ///
    /// Submitters who never minted or were never verified have no profile;
    /// their proofs stay in the registry only and `None` is returned.
    pub fn record_proof(&mut self, worker: Address) -> Option<u64> {
        let profile = self.profiles.get_mut(&worker)?;
        profile.proof_count += 1;
        Some(profile.proof_count)
    }

    // === Views ===

    pub fn identity(&self) -> Address {
        self.identity
    }

    pub fn name(&self) -> &'static str {
        TOKEN_NAME
    }

    pub fn symbol(&self) -> &'static str {
        TOKEN_SYMBOL
    }

    pub fn decimals(&self) -> u8 {
        DECIMALS
    }

    pub fn attestations(&self) -> &AttestationRegistry {
        &self.attestations
    }

    pub fn valuation(&self) -> &ValuationEngine {
        &self.valuation
    }

    pub fn policy(&self) -> &IssuancePolicy {
        &self.policy
    }

    pub fn profile(&self, worker: &Address) -> Option<&WorkerProfile> {
        self.profiles.get(worker)
    }

    pub fn worker_account(&self, worker: &Address) -> Option<WorkerAccount> {
        let profile = self.profiles.get(worker)?.clone();
        Some(WorkerAccount {
            balance: self.balance_of(worker),
            nonce_high_watermark: self.attestations.nonce_high_watermark(worker),
            profile,
        })
    }
}
