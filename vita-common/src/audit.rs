//! Auditable before/after records for privileged mutations.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{access::Role, Address, Timestamp};

/// A single privileged state change with its previous and new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminChange {
    SkillRate {
        category: u8,
        #[serde(with = "crate::u128_string")]
        before: u128,
        #[serde(with = "crate::u128_string")]
        after: u128,
    },
    OracleAdded {
        oracle: Address,
        before: bool,
        after: bool,
    },
    OracleRemoved {
        oracle: Address,
        before: bool,
        after: bool,
    },
    MinQualityScore {
        before: u64,
        after: u64,
    },
    ProofVerifier {
        before: String,
        after: String,
    },
    RoleGranted {
        account: Address,
        role: Role,
        before: bool,
        after: bool,
    },
    RoleRevoked {
        account: Address,
        role: Role,
        before: bool,
        after: bool,
    },
    WorkerVerified {
        worker: Address,
        before: bool,
        after: bool,
    },
}

impl AdminChange {
    pub fn label(&self) -> &'static str {
        match self {
            AdminChange::SkillRate { .. } => "skill_rate",
            AdminChange::OracleAdded { .. } => "oracle_added",
            AdminChange::OracleRemoved { .. } => "oracle_removed",
            AdminChange::MinQualityScore { .. } => "min_quality_score",
            AdminChange::ProofVerifier { .. } => "proof_verifier",
            AdminChange::RoleGranted { .. } => "role_granted",
            AdminChange::RoleRevoked { .. } => "role_revoked",
            AdminChange::WorkerVerified { .. } => "worker_verified",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    /// Monotonic sequence number within one log.
    pub seq: u64,
    pub actor: Address,
    pub at: Timestamp,
    pub change: AdminChange,
}

/// Append-only audit trail.
#[derive(Debug, Clone, Default)]
pub struct AuditLog {
    records: Vec<AuditRecord>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, actor: Address, at: Timestamp, change: AdminChange) -> AuditRecord {
        let record = AuditRecord {
            seq: self.records.len() as u64,
            actor,
            at,
            change,
        };
        info!(
            seq = record.seq,
            actor = %record.actor,
            change = record.change.label(),
            "admin change recorded"
        );
        self.records.push(record.clone());
        record
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
