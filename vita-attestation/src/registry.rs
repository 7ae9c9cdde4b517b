//! Authorized-oracle set and per-worker nonce consumption.

use std::collections::{BTreeSet, HashMap, HashSet};

use tracing::debug;
use vita_common::{AdminChange, Address, Caller, Role};

use crate::{
    eip712::{typed_data_digest, Eip712Domain},
    signature::{recover_signer, AttestationSignature},
    Attestation, AttestationError,
};

/// Replay and freshness gate for attestations.
///
/// Nonces come from the oracle and are not sequential, so each worker has
/// its own consumed set rather than a counter. Validation is split into
/// [`check`](Self::check) (read-only) and [`consume`](Self::consume) so a
/// caller can run every other precondition before committing.
#[derive(Debug, Clone)]
pub struct AttestationRegistry {
    domain: Eip712Domain,
    oracles: BTreeSet<Address>,
    consumed: HashMap<Address, HashSet<u128>>,
    high_watermark: HashMap<Address, u128>,
}

impl AttestationRegistry {
    pub fn new(domain: Eip712Domain, oracles: impl IntoIterator<Item = Address>) -> Self {
        Self {
            domain,
            oracles: oracles.into_iter().collect(),
            consumed: HashMap::new(),
            high_watermark: HashMap::new(),
        }
    }

    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    // === Oracle set ===

    pub fn is_authorized_oracle(&self, address: &Address) -> bool {
        self.oracles.contains(address)
    }

    pub fn oracles(&self) -> Vec<Address> {
        self.oracles.iter().copied().collect()
    }

    pub fn add_oracle(
        &mut self,
        caller: &Caller,
        oracle: Address,
    ) -> Result<AdminChange, AttestationError> {
        caller.require(Role::Admin)?;
        let before = !self.oracles.insert(oracle);
        Ok(AdminChange::OracleAdded {
            oracle,
            before,
            after: true,
        })
    }

    pub fn remove_oracle(
        &mut self,
        caller: &Caller,
        oracle: Address,
    ) -> Result<AdminChange, AttestationError> {
        caller.require(Role::Admin)?;
        let before = self.oracles.remove(&oracle);
        Ok(AdminChange::OracleRemoved {
            oracle,
            before,
            after: false,
        })
    }

    // === Verification ===

    /// Recover the signer and require it to be a currently authorized oracle.
    pub fn verify_signer(
        &self,
        attestation: &Attestation,
        signature: &AttestationSignature,
    ) -> Result<Address, AttestationError> {
        let digest = typed_data_digest(&self.domain, attestation);
        let signer = recover_signer(&digest, signature)?;
        if !self.is_authorized_oracle(&signer) {
            return Err(AttestationError::UnauthorizedSigner(signer));
        }
        Ok(signer)
    }

    /// Freshness and replay check without consuming anything.
    pub fn check(
        &self,
        worker: &Address,
        nonce: u128,
        valid_until: u64,
        now: u64,
    ) -> Result<(), AttestationError> {
        if now > valid_until {
            return Err(AttestationError::Expired { valid_until, now });
        }
        if self.is_nonce_consumed(worker, nonce) {
            return Err(AttestationError::NonceReused {
                worker: *worker,
                nonce,
            });
        }
        Ok(())
    }

    /// Mark `nonce` consumed. Returns `false` if it already was.
    pub fn consume(&mut self, worker: Address, nonce: u128) -> bool {
        let inserted = self.consumed.entry(worker).or_default().insert(nonce);
        if inserted {
            let mark = self.high_watermark.entry(worker).or_insert(nonce);
            if nonce > *mark {
                *mark = nonce;
            }
            debug!(worker = %worker, nonce, "attestation nonce consumed");
        }
        inserted
    }

    pub fn validate_and_consume(
        &mut self,
        worker: Address,
        nonce: u128,
        valid_until: u64,
        now: u64,
    ) -> Result<(), AttestationError> {
        self.check(&worker, nonce, valid_until, now)?;
        self.consume(worker, nonce);
        Ok(())
    }

    // === Views ===

    pub fn is_nonce_consumed(&self, worker: &Address, nonce: u128) -> bool {
        self.consumed
            .get(worker)
            .map(|set| set.contains(&nonce))
            .unwrap_or(false)
    }

    /// Largest nonce consumed for `worker`, if any.
    pub fn nonce_high_watermark(&self, worker: &Address) -> Option<u128> {
        self.high_watermark.get(worker).copied()
    }

    pub fn consumed_count(&self, worker: &Address) -> usize {
        self.consumed.get(worker).map(HashSet::len).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> AttestationRegistry {
        AttestationRegistry::new(
            Eip712Domain {
                name: "VITA Protocol".into(),
                version: "1".into(),
                chain_id: 5003,
                verifying_contract: Address([0xcc; 20]),
            },
            [Address([0x01; 20])],
        )
    }

    #[test]
    fn expiry_is_inclusive_of_valid_until() {
        let mut reg = registry();
        let worker = Address([9; 20]);
        assert!(reg.validate_and_consume(worker, 1, 100, 100).is_ok());
        assert_eq!(
            reg.validate_and_consume(worker, 2, 100, 101),
            Err(AttestationError::Expired {
                valid_until: 100,
                now: 101
            })
        );
        assert!(!reg.is_nonce_consumed(&worker, 2));
    }

    #[test]
    fn nonces_are_per_worker_and_unordered() {
        let mut reg = registry();
        let a = Address([1; 20]);
        let b = Address([2; 20]);
        reg.validate_and_consume(a, 500, 10, 0).unwrap();
        reg.validate_and_consume(a, 3, 10, 0).unwrap();
        reg.validate_and_consume(b, 500, 10, 0).unwrap();

        assert_eq!(
            reg.validate_and_consume(a, 3, 10, 0),
            Err(AttestationError::NonceReused { worker: a, nonce: 3 })
        );
        assert_eq!(reg.nonce_high_watermark(&a), Some(500));
        assert_eq!(reg.consumed_count(&a), 2);
        assert_eq!(reg.consumed_count(&b), 1);
    }

    #[test]
    fn check_does_not_consume() {
        let reg = registry();
        let worker = Address([4; 20]);
        reg.check(&worker, 7, 10, 0).unwrap();
        reg.check(&worker, 7, 10, 0).unwrap();
        assert!(!reg.is_nonce_consumed(&worker, 7));
    }

    #[test]
    fn oracle_rotation_requires_admin() {
        let mut reg = registry();
        let outsider = Caller::unprivileged(Address([5; 20]));
        assert!(matches!(
            reg.add_oracle(&outsider, Address([2; 20])),
            Err(AttestationError::Access(_))
        ));

        let admin = Caller::new(Address([6; 20]), [Role::Admin]);
        let change = reg.add_oracle(&admin, Address([2; 20])).unwrap();
        assert_eq!(
            change,
            AdminChange::OracleAdded {
                oracle: Address([2; 20]),
                before: false,
                after: true
            }
        );
        assert_eq!(reg.oracles().len(), 2);

        reg.remove_oracle(&admin, Address([1; 20])).unwrap();
        assert!(!reg.is_authorized_oracle(&Address([1; 20])));
        assert!(reg.is_authorized_oracle(&Address([2; 20])));
    }
}
