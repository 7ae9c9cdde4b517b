//! Oracle-side attestation signing.

use k256::ecdsa::{SigningKey, VerifyingKey};
use vita_common::Address;

use crate::{
    eip712::{typed_data_digest, Eip712Domain},
    signature::{address_of, AttestationSignature},
    Attestation, AttestationError,
};

/// secp256k1 key used by a valuation oracle to sign attestations.
#[derive(Clone)]
pub struct OracleSigner {
    key: SigningKey,
    address: Address,
}

impl OracleSigner {
    pub fn from_slice(secret: &[u8]) -> Result<Self, AttestationError> {
        let key =
            SigningKey::from_slice(secret).map_err(|e| AttestationError::InvalidKey(e.to_string()))?;
        let address = address_of(&VerifyingKey::from(&key));
        Ok(Self { key, address })
    }

    pub fn from_hex(secret_hex: &str) -> Result<Self, AttestationError> {
        let stripped = secret_hex.trim().trim_start_matches("0x");
        let bytes = hex::decode(stripped).map_err(|e| AttestationError::InvalidKey(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest; always produces a low-s signature with `v` in {27, 28}.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Result<AttestationSignature, AttestationError> {
        let (signature, recovery_id) = self
            .key
            .sign_prehash_recoverable(digest)
            .map_err(|e| AttestationError::Signing(e.to_string()))?;
        let bytes = signature.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..]);
        Ok(AttestationSignature {
            r,
            s,
            v: 27 + recovery_id.to_byte(),
        })
    }

    pub fn sign_attestation(
        &self,
        domain: &Eip712Domain,
        attestation: &Attestation,
    ) -> Result<AttestationSignature, AttestationError> {
        self.sign_digest(&typed_data_digest(domain, attestation))
    }
}

impl std::fmt::Debug for OracleSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OracleSigner")
            .field("address", &self.address)
            .finish_non_exhaustive()
    }
}
