//! Proof verifier with a scripted verdict.

use std::sync::{
    atomic::{AtomicBool, AtomicUsize, Ordering},
    Arc,
};

use vita_proof_registry::{Groth16Proof, ProofVerifier, PublicSignals};

/// Verifier with a settable verdict and a call counter.
///
/// Clones share state so a test can flip the verdict or read the count after
/// handing one copy to the registry.
#[derive(Debug, Clone)]
pub struct ScriptedVerifier {
    accept: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl ScriptedVerifier {
    pub fn accepting() -> Self {
        Self::new(true)
    }

    pub fn rejecting() -> Self {
        Self::new(false)
    }

    pub fn new(accept: bool) -> Self {
        Self {
            accept: Arc::new(AtomicBool::new(accept)),
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl ProofVerifier for ScriptedVerifier {
    fn verify(&self, _proof: &Groth16Proof, _signals: &PublicSignals) -> bool {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.accept.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{sample_proof, sample_signals};

    #[test]
    fn scripted_counts_calls_across_clones() {
        let verifier = ScriptedVerifier::accepting();
        let handle = verifier.clone();
        let proof = sample_proof().unwrap();
        let signals = sample_signals(101, 80, 401).unwrap();

        assert!(verifier.verify(&proof, &signals));
        handle.set_accept(false);
        assert!(!verifier.verify(&proof, &signals));
        assert_eq!(handle.calls(), 2);
    }
}
