//! Pluggable proof verification.

use tracing::debug;

use crate::field;
use crate::{Groth16Proof, PublicSignals};

/// Black-box Groth16 verifier the registry delegates to.
pub trait ProofVerifier: Send + Sync {
    fn verify(&self, proof: &Groth16Proof, signals: &PublicSignals) -> bool;

    /// Stable label recorded in the admin audit trail.
    fn name(&self) -> &str;
}

/// Input checks a pairing verifier runs before the pairing: no point at
/// infinity, every coordinate below the base-field modulus, every signal a
/// scalar. Pairings are out of scope.
#[derive(Debug, Default, Clone, Copy)]
pub struct StructuralVerifier;

impl ProofVerifier for StructuralVerifier {
    fn verify(&self, proof: &Groth16Proof, signals: &PublicSignals) -> bool {
        if proof.a.is_zero() || proof.b.is_zero() || proof.c.is_zero() {
            debug!("proof contains a zero point");
            return false;
        }
        if !proof.coordinates().into_iter().all(field::is_base_element) {
            debug!("proof coordinate outside base field");
            return false;
        }
        signals.to_words().iter().all(field::is_scalar)
    }

    fn name(&self) -> &str {
        "structural"
    }
}
