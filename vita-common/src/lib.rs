//! vita-common
//!
//! Primitives shared by every VITA protocol crate: account addresses, the
//! caller/role model used for access checks, admin audit records, 18-decimal
//! fixed-point helpers, the error taxonomy and protocol configuration.

use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

pub mod access;
pub mod audit;
pub mod config;
pub mod error;
pub mod fixed;

pub use access::{AccessControl, Caller, Role};
pub use audit::{AdminChange, AuditLog, AuditRecord};
pub use config::{
    DomainConfig, ProofConfig, ProtocolConfig, StakingConfig, ValuationConfig, YieldSplit,
};
pub use error::{CommonError, ErrorKind};
pub use fixed::{bps_share, format_fixed, mul_div, to_fixed, BPS_DENOMINATOR, PRECISION};

/// Unix timestamp in seconds.
pub type Timestamp = u64;

// ═══════════════════════════════════════════════════════════════════════════════
// ADDRESSES
// ═══════════════════════════════════════════════════════════════════════════════

/// 20-byte account identity (Ethereum-style address).
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const ZERO: Address = Address([0u8; 20]);

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CommonError> {
        let raw: [u8; 20] = bytes.try_into().map_err(|_| {
            CommonError::InvalidAddress(format!("expected 20 bytes, got {}", bytes.len()))
        })?;
        Ok(Self(raw))
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Left-pad into a 32-byte ABI word.
    pub fn to_word(&self) -> [u8; 32] {
        let mut word = [0u8; 32];
        word[12..].copy_from_slice(&self.0);
        word
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({self})")
    }
}

impl FromStr for Address {
    type Err = CommonError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let stripped = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let bytes = hex::decode(stripped)
            .map_err(|e| CommonError::InvalidAddress(format!("{s}: {e}")))?;
        Self::from_slice(&bytes)
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(de::Error::custom)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SERDE HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Serialize `u128` amounts as decimal strings.
///
/// JSON producers on the oracle side cannot represent 18-decimal token
/// amounts as numbers, so strings are the wire form. Plain numbers are still
/// accepted when they fit in a `u64`.
pub mod u128_string {
    use serde::{de, Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(u64),
    }

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        match Repr::deserialize(deserializer)? {
            Repr::Text(s) => s.trim().parse().map_err(de::Error::custom),
            Repr::Number(n) => Ok(u128::from(n)),
        }
    }
}

/// Serialize 32-byte words as `0x`-prefixed hex.
pub mod hex_bytes32 {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("0x{}", hex::encode(value)))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_bytes32(&s).map_err(de::Error::custom)
    }
}

/// Parse a `0x`-prefixed (or bare) 64-character hex string.
pub fn parse_bytes32(s: &str) -> Result<[u8; 32], String> {
    let stripped = s.trim().trim_start_matches("0x");
    let bytes = hex::decode(stripped).map_err(|e| e.to_string())?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| format!("expected 32 bytes, got {}", b.len()))
}
