//! BN254 field bounds and word encodings.

use num_bigint::BigUint;
use once_cell::sync::Lazy;

use crate::ProofRegistryError;

/// 32-byte big-endian field element.
pub type Word = [u8; 32];

/// Scalar field order `r`; public signals live here.
pub static SCALAR_MODULUS: Lazy<BigUint> = Lazy::new(|| {
    decimal(
        "21888242871839275222246405745257275088548364400416034343698204186575808495617",
    )
});

/// Base field modulus `q`; curve point coordinates live here.
pub static BASE_MODULUS: Lazy<BigUint> = Lazy::new(|| {
    decimal(
        "21888242871839275222246405745257275088696311157297823662689037894645226208583",
    )
});

fn decimal(digits: &str) -> BigUint {
    BigUint::parse_bytes(digits.as_bytes(), 10).unwrap_or_default()
}

pub fn to_biguint(word: &Word) -> BigUint {
    BigUint::from_bytes_be(word)
}

pub fn is_scalar(word: &Word) -> bool {
    to_biguint(word) < *SCALAR_MODULUS
}

pub fn is_base_element(word: &Word) -> bool {
    to_biguint(word) < *BASE_MODULUS
}

pub fn word_from_u64(value: u64) -> Word {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// Narrow a word to `u64`, or `None` when any high byte is set.
pub fn word_to_u64(word: &Word) -> Option<u64> {
    if word[..24].iter().any(|b| *b != 0) {
        return None;
    }
    let mut low = [0u8; 8];
    low.copy_from_slice(&word[24..]);
    Some(u64::from_be_bytes(low))
}

/// Parse a snarkjs-style decimal string (or `0x` hex) into a word.
pub fn parse_word(text: &str) -> Result<Word, ProofRegistryError> {
    let text = text.trim();
    if let Some(hex_digits) = text.strip_prefix("0x") {
        return vita_common::parse_bytes32(&format!("{hex_digits:0>64}"))
            .map_err(ProofRegistryError::InvalidSignals);
    }
    let value = BigUint::parse_bytes(text.as_bytes(), 10)
        .ok_or_else(|| ProofRegistryError::InvalidSignals(format!("not a decimal integer: {text:?}")))?;
    let bytes = value.to_bytes_be();
    if bytes.len() > 32 {
        return Err(ProofRegistryError::InvalidSignals(format!(
            "{text} does not fit in 256 bits"
        )));
    }
    let mut word = [0u8; 32];
    word[32 - bytes.len()..].copy_from_slice(&bytes);
    Ok(word)
}

pub fn word_to_decimal(word: &Word) -> String {
    to_biguint(word).to_str_radix(10)
}
