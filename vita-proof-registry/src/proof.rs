//! Groth16 proof shape as produced by snarkjs.

use serde::{Deserialize, Serialize};

use crate::field::{self, Word};
use crate::ProofRegistryError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct G1Point {
    #[serde(with = "vita_common::hex_bytes32")]
    pub x: Word,
    #[serde(with = "vita_common::hex_bytes32")]
    pub y: Word,
}

/// G2 coordinates are `Fq2` elements stored as `[c0, c1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct G2Point {
    pub x: [Fq2Word; 2],
    pub y: [Fq2Word; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fq2Word(#[serde(with = "vita_common::hex_bytes32")] pub Word);

impl G1Point {
    pub fn is_zero(&self) -> bool {
        self.x == [0u8; 32] && self.y == [0u8; 32]
    }

    fn coordinates(&self) -> [&Word; 2] {
        [&self.x, &self.y]
    }
}

impl G2Point {
    pub fn is_zero(&self) -> bool {
        self.coordinates().iter().all(|w| **w == [0u8; 32])
    }

    fn coordinates(&self) -> [&Word; 4] {
        [&self.x[0].0, &self.x[1].0, &self.y[0].0, &self.y[1].0]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Groth16Proof {
    pub a: G1Point,
    pub b: G2Point,
    pub c: G1Point,
}

/// `proof.json` as written by `snarkjs groth16 prove`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnarkjsProof {
    pub pi_a: Vec<String>,
    pub pi_b: Vec<Vec<String>>,
    pub pi_c: Vec<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub curve: Option<String>,
}

impl Groth16Proof {
    /// Every affine coordinate in `a, b, c` order.
    pub fn coordinates(&self) -> Vec<&Word> {
        let mut all = Vec::with_capacity(8);
        all.extend(self.a.coordinates());
        all.extend(self.b.coordinates());
        all.extend(self.c.coordinates());
        all
    }

    /// blake3 over the concatenated coordinates, hex encoded.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for word in self.coordinates() {
            hasher.update(word);
        }
        hasher.finalize().to_hex().to_string()
    }

    pub fn from_snarkjs_json(json: &str) -> Result<Self, ProofRegistryError> {
        let raw: SnarkjsProof = serde_json::from_str(json)
            .map_err(|e| ProofRegistryError::MalformedProof(e.to_string()))?;
        Self::try_from(raw)
    }
}

impl TryFrom<SnarkjsProof> for Groth16Proof {
    type Error = ProofRegistryError;

    fn try_from(raw: SnarkjsProof) -> Result<Self, Self::Error> {
        if let Some(protocol) = raw.protocol.as_deref() {
            if protocol != "groth16" {
                return Err(ProofRegistryError::MalformedProof(format!(
                    "unsupported protocol {protocol}"
                )));
            }
        }
        let g1 = |coords: &[String], name: &str| -> Result<G1Point, ProofRegistryError> {
            if coords.len() < 2 {
                return Err(ProofRegistryError::MalformedProof(format!(
                    "{name} needs two coordinates"
                )));
            }
            Ok(G1Point {
                x: coordinate(&coords[0])?,
                y: coordinate(&coords[1])?,
            })
        };
        let fq2 = |pair: Option<&Vec<String>>| -> Result<[Fq2Word; 2], ProofRegistryError> {
            match pair.map(Vec::as_slice) {
                Some([c0, c1, ..]) => Ok([Fq2Word(coordinate(c0)?), Fq2Word(coordinate(c1)?)]),
                _ => Err(ProofRegistryError::MalformedProof(
                    "pi_b needs two Fq2 coordinates".into(),
                )),
            }
        };

        Ok(Self {
            a: g1(raw.pi_a.as_slice(), "pi_a")?,
            b: G2Point {
                x: fq2(raw.pi_b.first())?,
                y: fq2(raw.pi_b.get(1))?,
            },
            c: g1(raw.pi_c.as_slice(), "pi_c")?,
        })
    }
}

fn coordinate(text: &str) -> Result<Word, ProofRegistryError> {
    field::parse_word(text).map_err(|e| ProofRegistryError::MalformedProof(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROOF_JSON: &str = r#"{
        "pi_a": ["1", "2", "1"],
        "pi_b": [["3", "4"], ["5", "6"], ["1", "0"]],
        "pi_c": ["7", "8", "1"],
        "protocol": "groth16",
        "curve": "bn128"
    }"#;

    #[test]
    fn parses_snarkjs_proof_json() {
        let proof = Groth16Proof::from_snarkjs_json(PROOF_JSON).unwrap();
        assert_eq!(proof.a.x, field::word_from_u64(1));
        assert_eq!(proof.b.x[1].0, field::word_from_u64(4));
        assert_eq!(proof.b.y[0].0, field::word_from_u64(5));
        assert_eq!(proof.c.y, field::word_from_u64(8));
        assert_eq!(proof.coordinates().len(), 8);
    }

    #[test]
    fn fingerprint_tracks_every_coordinate() {
        let proof = Groth16Proof::from_snarkjs_json(PROOF_JSON).unwrap();
        let mut other = proof;
        other.b.y[1] = Fq2Word(field::word_from_u64(9));
        assert_eq!(proof.fingerprint().len(), 64);
        assert_ne!(proof.fingerprint(), other.fingerprint());
    }

    #[test]
    fn rejects_other_protocols() {
        let json = PROOF_JSON.replace("groth16", "plonk");
        assert!(matches!(
            Groth16Proof::from_snarkjs_json(&json),
            Err(ProofRegistryError::MalformedProof(_))
        ));
    }

    #[test]
    fn rejects_truncated_points() {
        let json = r#"{"pi_a": ["1"], "pi_b": [["3", "4"], ["5", "6"]], "pi_c": ["7", "8"]}"#;
        assert!(Groth16Proof::from_snarkjs_json(json).is_err());
    }
}
