//! EIP-712 typed-data hashing for attestations.
//!
//! Digest layout: `keccak256(0x19 0x01 ‖ domainSeparator ‖ structHash)`, where
//! every struct member is encoded as one 32-byte ABI word and dynamic `string`
//! members are replaced by their keccak hash.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use vita_common::{Address, DomainConfig};

use crate::Attestation;

pub const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

pub const ATTESTATION_TYPE: &str = "VitalityAttestation(address worker,string githubUsername,\
uint256 vitalityScore,uint256 reliabilityScore,uint256 pledgedHours,uint8 skillCategory,\
uint256 tokenValue,uint256 validUntil,uint256 nonce)";

pub static DOMAIN_TYPEHASH: Lazy<[u8; 32]> = Lazy::new(|| keccak256(DOMAIN_TYPE.as_bytes()));

pub static ATTESTATION_TYPEHASH: Lazy<[u8; 32]> =
    Lazy::new(|| keccak256(ATTESTATION_TYPE.as_bytes()));

pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(bytes);
    hasher.finalize().into()
}

/// Signing domain binding signatures to one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Eip712Domain {
    pub name: String,
    pub version: String,
    pub chain_id: u64,
    pub verifying_contract: Address,
}

impl Eip712Domain {
    pub fn separator(&self) -> [u8; 32] {
        let mut encoded = Vec::with_capacity(5 * 32);
        encoded.extend_from_slice(DOMAIN_TYPEHASH.as_ref());
        encoded.extend_from_slice(&keccak256(self.name.as_bytes()));
        encoded.extend_from_slice(&keccak256(self.version.as_bytes()));
        encoded.extend_from_slice(&uint_word(u128::from(self.chain_id)));
        encoded.extend_from_slice(&self.verifying_contract.to_word());
        keccak256(&encoded)
    }
}

impl From<&DomainConfig> for Eip712Domain {
    fn from(config: &DomainConfig) -> Self {
        Self {
            name: config.name.clone(),
            version: config.version.clone(),
            chain_id: config.chain_id,
            verifying_contract: config.verifying_contract,
        }
    }
}

/// `hashStruct(VitalityAttestation)`.
pub fn struct_hash(attestation: &Attestation) -> [u8; 32] {
    // Layout: typehash + 9 members, one word each.
    let mut encoded = Vec::with_capacity(10 * 32);
    encoded.extend_from_slice(ATTESTATION_TYPEHASH.as_ref());
    encoded.extend_from_slice(&attestation.worker.to_word());
    encoded.extend_from_slice(&keccak256(attestation.external_username.as_bytes()));
    encoded.extend_from_slice(&uint_word(u128::from(attestation.vitality_score)));
    encoded.extend_from_slice(&uint_word(u128::from(attestation.reliability_score)));
    encoded.extend_from_slice(&uint_word(u128::from(attestation.pledged_hours)));
    encoded.extend_from_slice(&uint_word(u128::from(attestation.skill_category)));
    encoded.extend_from_slice(&uint_word(attestation.token_value));
    encoded.extend_from_slice(&uint_word(u128::from(attestation.valid_until)));
    encoded.extend_from_slice(&uint_word(attestation.nonce));
    keccak256(&encoded)
}

/// Final digest the oracle signs.
pub fn typed_data_digest(domain: &Eip712Domain, attestation: &Attestation) -> [u8; 32] {
    let mut preimage = Vec::with_capacity(2 + 32 + 32);
    preimage.extend_from_slice(&[0x19, 0x01]);
    preimage.extend_from_slice(&domain.separator());
    preimage.extend_from_slice(&struct_hash(attestation));
    keccak256(&preimage)
}

/// Unsigned integer as a big-endian, left-padded ABI word.
fn uint_word(value: u128) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[16..].copy_from_slice(&value.to_be_bytes());
    word
}
