//! Recoverable secp256k1 signatures and signer recovery.

use std::fmt;

use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use vita_common::Address;

use crate::{eip712::keccak256, AttestationError};

/// `r ‖ s ‖ v`.
pub const SIGNATURE_LENGTH: usize = 65;

/// Detached `(r, s, v)` signature triple over an attestation digest.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AttestationSignature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    /// Recovery byte: `27`/`28` (Ethereum convention) or raw `0`/`1`.
    pub v: u8,
}

impl AttestationSignature {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AttestationError> {
        if bytes.len() != SIGNATURE_LENGTH {
            return Err(AttestationError::MalformedSignature(format!(
                "expected {SIGNATURE_LENGTH} bytes, got {}",
                bytes.len()
            )));
        }
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&bytes[..32]);
        s.copy_from_slice(&bytes[32..64]);
        Ok(Self { r, s, v: bytes[64] })
    }

    pub fn from_hex(value: &str) -> Result<Self, AttestationError> {
        let stripped = value.trim().trim_start_matches("0x");
        let bytes = hex::decode(stripped)
            .map_err(|e| AttestationError::MalformedSignature(e.to_string()))?;
        Self::from_bytes(&bytes)
    }

    pub fn to_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes()))
    }

    fn recovery_id(&self) -> Result<RecoveryId, AttestationError> {
        let normalized = match self.v {
            0 | 1 => self.v,
            27 | 28 => self.v - 27,
            other => return Err(AttestationError::InvalidRecoveryId(other)),
        };
        RecoveryId::from_byte(normalized).ok_or(AttestationError::InvalidRecoveryId(self.v))
    }
}

impl fmt::Debug for AttestationSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttestationSignature({})", self.to_hex())
    }
}

impl Serialize for AttestationSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for AttestationSignature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(de::Error::custom)
    }
}

/// Recover the address that produced `signature` over `digest`.
///
/// Rejects zero or out-of-range scalars, unknown recovery ids and high-s
/// signatures, so every digest has at most one accepted signature per key.
pub fn recover_signer(
    digest: &[u8; 32],
    signature: &AttestationSignature,
) -> Result<Address, AttestationError> {
    let recovery_id = signature.recovery_id()?;

    let mut rs = [0u8; 64];
    rs[..32].copy_from_slice(&signature.r);
    rs[32..].copy_from_slice(&signature.s);
    let parsed = Signature::from_slice(&rs)
        .map_err(|_| AttestationError::MalformedSignature("r or s out of range".into()))?;

    if parsed.normalize_s().is_some() {
        return Err(AttestationError::HighS);
    }

    let key = VerifyingKey::recover_from_prehash(digest, &parsed, recovery_id)
        .map_err(|_| AttestationError::RecoveryFailed)?;
    Ok(address_of(&key))
}

/// Ethereum-style address: last 20 bytes of `keccak256(X ‖ Y)`.
pub fn address_of(key: &VerifyingKey) -> Address {
    let point = key.to_encoded_point(false);
    let hash = keccak256(&point.as_bytes()[1..]);
    let mut raw = [0u8; 20];
    raw.copy_from_slice(&hash[12..]);
    Address(raw)
}
