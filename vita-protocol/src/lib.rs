//! vita-protocol
//!
//! [`Protocol`] owns every component (access table, minting ledger, staking
//! pool, proof registry, audit log) behind one lock. Mutations hold the write
//! lock for their whole duration, so each one is atomic and totally ordered
//! against every other; views take the read lock and never observe a partial
//! update.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;
use tracing::{debug, info};
use vita_attestation::{Attestation, AttestationRegistry, AttestationSignature, Eip712Domain};
use vita_common::{
    AccessControl, AdminChange, Address, AuditLog, AuditRecord, Caller, CommonError,
    ProtocolConfig, Role, Timestamp,
};
use vita_ledger::{
    Collateral, EchoRecord, IssuancePolicy, MintReceipt, MintingLedger, WorkerAccount,
    YieldDistribution,
};
use vita_proof_registry::{
    Groth16Proof, ProofVerifier, PublicSignals, WorkProofRecord, WorkProofRegistry, Word,
};
use vita_staking::{
    SimulatedWrappedAsset, StakeView, StakingPool, UnstakeReceipt, WrappedAsset, YieldClaim,
};
use vita_valuation::ValuationEngine;

pub mod error;

pub use error::ProtocolError;

struct ProtocolState<A: WrappedAsset> {
    access: AccessControl,
    ledger: MintingLedger,
    staking: StakingPool<A>,
    proofs: WorkProofRegistry,
    audit: AuditLog,
}

/// Aggregate figures for dashboards and the CLI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProtocolSummary {
    #[serde(with = "vita_common::u128_string")]
    pub total_supply: u128,
    pub echo_count: u64,
    #[serde(with = "vita_common::u128_string")]
    pub total_staked: u128,
    #[serde(with = "vita_common::u128_string")]
    pub exchange_rate: u128,
    #[serde(with = "vita_common::u128_string")]
    pub treasury_balance: u128,
    #[serde(with = "vita_common::u128_string")]
    pub holder_pool_balance: u128,
    #[serde(with = "vita_common::u128_string")]
    pub echo_holder_pool: u128,
    pub total_proofs: usize,
    pub audit_records: usize,
    pub oracles: Vec<Address>,
}

pub struct Protocol<A: WrappedAsset = SimulatedWrappedAsset> {
    config: Arc<ProtocolConfig>,
    state: Arc<RwLock<ProtocolState<A>>>,
}

impl<A: WrappedAsset> Clone for Protocol<A> {
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: WrappedAsset> Protocol<A> {
    /// Build the protocol from configuration.
    ///
    /// `admin` receives [`Role::Admin`]; the ledger identity
    /// (`config.domain.verifying_contract`) receives [`Role::StakeCreditor`].
    /// The grant is the first audit record.
    pub fn new(
        config: ProtocolConfig,
        admin: Address,
        oracles: impl IntoIterator<Item = Address>,
        asset: A,
        verifier: Box<dyn ProofVerifier>,
    ) -> Result<Self, ProtocolError> {
        config
            .validate()
            .map_err(|e| CommonError::Config(format!("{e:#}")))?;
        let identity = config.domain.verifying_contract;
        if identity.is_zero() {
            return Err(CommonError::Config("domain.verifying_contract must be set".into()).into());
        }

        let mut access = AccessControl::with_admin(admin);
        let root = access.caller(admin);
        let grant = access.grant_role(&root, Role::StakeCreditor, identity)?;
        let mut audit = AuditLog::new();
        audit.record(admin, 0, grant);

        let ledger = MintingLedger::new(
            identity,
            AttestationRegistry::new(Eip712Domain::from(&config.domain), oracles),
            ValuationEngine::from_config(&config.valuation),
            IssuancePolicy::from(&config.valuation),
            config.staking.split.worker_bps,
        );
        let staking = StakingPool::new(asset, config.staking.split);
        let proofs = WorkProofRegistry::from_config(&config.proofs, verifier);

        info!(
            ledger = %identity,
            chain_id = config.domain.chain_id,
            verifier = proofs.verifier_name(),
            "protocol initialized"
        );
        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(RwLock::new(ProtocolState {
                access,
                ledger,
                staking,
                proofs,
                audit,
            })),
        })
    }

    pub fn config(&self) -> &ProtocolConfig {
        &self.config
    }

    /// Resolve `address` with its currently granted roles.
    pub fn caller(&self, address: Address) -> Result<Caller, ProtocolError> {
        Ok(self.read()?.access.caller(address))
    }

    // ═══════════════════════════════════════════════════════════════════════
    // MINTING AND TOKEN
    // ═══════════════════════════════════════════════════════════════════════

    /// Mint for `caller`, optionally staking `collateral` for them in the
    /// same atomic step. A zero `collateral` stakes nothing.
    pub fn mint_echo(
        &self,
        caller: Address,
        attestation: &Attestation,
        signature: &AttestationSignature,
        collateral: u128,
        now: Timestamp,
    ) -> Result<MintReceipt, ProtocolError> {
        let mut guard = self.write()?;
        let state = &mut *guard;
        let caller = state.access.caller(caller);
        let collateral = if collateral > 0 {
            Some(Collateral {
                pool: &mut state.staking,
                credentials: state.access.caller(state.ledger.identity()),
                amount: collateral,
            })
        } else {
            None
        };
        Ok(state
            .ledger
            .mint_echo(&caller, attestation, signature, collateral, now)?)
    }

    pub fn transfer(&self, from: Address, to: Address, amount: u128) -> Result<(), ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(from);
        Ok(state.ledger.transfer(&caller, to, amount)?)
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: u128) -> Result<(), ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(owner);
        state.ledger.approve(&caller, spender, amount);
        Ok(())
    }

    pub fn transfer_from(
        &self,
        spender: Address,
        from: Address,
        to: Address,
        amount: u128,
    ) -> Result<(), ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(spender);
        Ok(state.ledger.transfer_from(&caller, from, to, amount)?)
    }

    pub fn distribute_yield(
        &self,
        from: Address,
        echo_id: u64,
        amount: u128,
    ) -> Result<YieldDistribution, ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(from);
        Ok(state.ledger.distribute_yield(&caller, echo_id, amount)?)
    }

    pub fn claim_worker_yield(&self, worker: Address) -> Result<u128, ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(worker);
        Ok(state.ledger.claim_worker_yield(&caller)?)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // STAKING
    // ═══════════════════════════════════════════════════════════════════════

    pub fn claim_yield(&self, worker: Address, now: Timestamp) -> Result<YieldClaim, ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(worker);
        Ok(state.staking.claim_yield(&caller, worker, now)?)
    }

    pub fn unstake(&self, worker: Address, now: Timestamp) -> Result<UnstakeReceipt, ProtocolError> {
        let mut state = self.write()?;
        let caller = state.access.caller(worker);
        Ok(state.staking.unstake(&caller, worker, now)?)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // WORK PROOFS
    // ═══════════════════════════════════════════════════════════════════════

    /// Admit a proof and count it against the submitter's profile, if they
    /// have one.
    pub fn submit_work_proof(
        &self,
        submitter: Address,
        proof: &Groth16Proof,
        signals: &PublicSignals,
        now: Timestamp,
    ) -> Result<WorkProofRecord, ProtocolError> {
        let mut state = self.write()?;
        let record = state
            .proofs
            .submit_work_proof(submitter, proof, signals, now)?;
        if state.ledger.record_proof(submitter).is_none() {
            debug!(submitter = %submitter, "proof admitted for submitter without a profile");
        }
        Ok(record)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // ADMIN
    // ═══════════════════════════════════════════════════════════════════════

    pub fn set_skill_rate(
        &self,
        actor: Address,
        skill_category: u8,
        rate: u128,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.ledger.set_skill_rate(caller, skill_category, rate)?)
        })
    }

    pub fn add_oracle(&self, actor: Address, oracle: Address, now: Timestamp) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| Ok(state.ledger.add_oracle(caller, oracle)?))
    }

    pub fn remove_oracle(
        &self,
        actor: Address,
        oracle: Address,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.ledger.remove_oracle(caller, oracle)?)
        })
    }

    pub fn set_min_quality_score(
        &self,
        actor: Address,
        score: u64,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.proofs.set_min_quality_score(caller, score)?)
        })
    }

    pub fn set_proof_verifier(
        &self,
        actor: Address,
        verifier: Box<dyn ProofVerifier>,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.proofs.set_verifier(caller, verifier)?)
        })
    }

    pub fn grant_role(
        &self,
        actor: Address,
        role: Role,
        account: Address,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.access.grant_role(caller, role, account)?)
        })
    }

    pub fn revoke_role(
        &self,
        actor: Address,
        role: Role,
        account: Address,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.access.revoke_role(caller, role, account)?)
        })
    }

    pub fn verify_worker(
        &self,
        actor: Address,
        worker: Address,
        external_username: &str,
        now: Timestamp,
    ) -> Result<AuditRecord, ProtocolError> {
        self.admin(actor, now, |caller, state| {
            Ok(state.ledger.verify_worker(caller, worker, external_username)?)
        })
    }

    // ═══════════════════════════════════════════════════════════════════════
    // VIEWS
    // ═══════════════════════════════════════════════════════════════════════

    pub fn balance_of(&self, account: &Address) -> Result<u128, ProtocolError> {
        Ok(self.read()?.ledger.balance_of(account))
    }

    pub fn allowance(&self, owner: &Address, spender: &Address) -> Result<u128, ProtocolError> {
        Ok(self.read()?.ledger.allowance(owner, spender))
    }

    pub fn total_supply(&self) -> Result<u128, ProtocolError> {
        Ok(self.read()?.ledger.total_supply())
    }

    pub fn worker_account(&self, worker: &Address) -> Result<Option<WorkerAccount>, ProtocolError> {
        Ok(self.read()?.ledger.worker_account(worker))
    }

    pub fn echo(&self, echo_id: u64) -> Result<Option<EchoRecord>, ProtocolError> {
        Ok(self.read()?.ledger.echo(echo_id).cloned())
    }

    pub fn pending_worker_yield(&self, worker: &Address) -> Result<u128, ProtocolError> {
        Ok(self.read()?.ledger.pending_worker_yield(worker))
    }

    pub fn is_nonce_consumed(&self, worker: &Address, nonce: u128) -> Result<bool, ProtocolError> {
        Ok(self.read()?.ledger.attestations().is_nonce_consumed(worker, nonce))
    }

    pub fn worker_stake(&self, worker: &Address) -> Result<Option<StakeView>, ProtocolError> {
        Ok(self.read()?.staking.worker_stake(worker))
    }

    pub fn pending_yield(&self, worker: &Address) -> Result<u128, ProtocolError> {
        Ok(self.read()?.staking.pending_yield(worker))
    }

    pub fn current_rate(&self) -> Result<u128, ProtocolError> {
        Ok(self.read()?.staking.current_rate())
    }

    pub fn is_proof_submitted(&self, proof_hash: &Word) -> Result<bool, ProtocolError> {
        Ok(self.read()?.proofs.is_proof_submitted(proof_hash))
    }

    pub fn proof(&self, proof_hash: &Word) -> Result<Option<WorkProofRecord>, ProtocolError> {
        Ok(self.read()?.proofs.get_proof(proof_hash).cloned())
    }

    pub fn worker_proof_count(&self, worker_commitment: &Word) -> Result<u64, ProtocolError> {
        Ok(self.read()?.proofs.worker_proof_count(worker_commitment))
    }

    pub fn has_role(&self, account: &Address, role: Role) -> Result<bool, ProtocolError> {
        Ok(self.read()?.access.has_role(account, role))
    }

    pub fn audit_records(&self) -> Result<Vec<AuditRecord>, ProtocolError> {
        Ok(self.read()?.audit.records().to_vec())
    }

    /// `total_supply == Σ balances`.
    pub fn supply_is_consistent(&self) -> Result<bool, ProtocolError> {
        Ok(self.read()?.ledger.supply_is_consistent())
    }

    pub fn summary(&self) -> Result<ProtocolSummary, ProtocolError> {
        let state = self.read()?;
        Ok(ProtocolSummary {
            total_supply: state.ledger.total_supply(),
            echo_count: state.ledger.echo_count(),
            total_staked: state.staking.total_staked(),
            exchange_rate: state.staking.current_rate(),
            treasury_balance: state.staking.treasury_balance(),
            holder_pool_balance: state.staking.holder_pool_balance(),
            echo_holder_pool: state.ledger.holder_yield_pool(),
            total_proofs: state.proofs.total_proofs(),
            audit_records: state.audit.len(),
            oracles: state.ledger.attestations().oracles(),
        })
    }

    // === Internals ===

    fn read(&self) -> Result<RwLockReadGuard<'_, ProtocolState<A>>, ProtocolError> {
        self.state.read().map_err(|_| ProtocolError::StatePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, ProtocolState<A>>, ProtocolError> {
        self.state.write().map_err(|_| ProtocolError::StatePoisoned)
    }

    /// Run a privileged mutation under the write lock and append its audit
    /// record.
    fn admin<F>(&self, actor: Address, now: Timestamp, apply: F) -> Result<AuditRecord, ProtocolError>
    where
        F: FnOnce(&Caller, &mut ProtocolState<A>) -> Result<AdminChange, ProtocolError>,
    {
        let mut state = self.write()?;
        let caller = state.access.caller(actor);
        let change = apply(&caller, &mut *state)?;
        Ok(state.audit.record(actor, now, change))
    }
}
