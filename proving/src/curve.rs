//! Pairing-friendly curves the pipeline can prove over.

use std::fmt;
use std::str::FromStr;

use ark_ec::pairing::Pairing;
use ark_ff::PrimeField;
use serde::{Deserialize, Serialize};

#[cfg(feature = "bls12-381")]
pub use ark_bls12_381::Bls12_381;
#[cfg(feature = "bn254")]
pub use ark_bn254::Bn254;

/// Curve tag stored in every artifact header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CurveId {
    #[default]
    #[serde(rename = "bn254")]
    Bn254,
    #[serde(rename = "bls12-381")]
    Bls12_381,
}

impl CurveId {
    pub fn tag(self) -> u8 {
        match self {
            CurveId::Bn254 => 1,
            CurveId::Bls12_381 => 2,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(CurveId::Bn254),
            2 => Some(CurveId::Bls12_381),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            CurveId::Bn254 => "bn254",
            CurveId::Bls12_381 => "bls12-381",
        }
    }
}

impl fmt::Display for CurveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CurveId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "bn254" | "bn128" => Ok(CurveId::Bn254),
            "bls12-381" | "bls12_381" => Ok(CurveId::Bls12_381),
            other => Err(format!("unknown curve `{other}` (expected bn254 or bls12-381)")),
        }
    }
}

/// A pairing engine with an artifact tag.
pub trait SupportedCurve: Pairing {
    const ID: CurveId;
}

/// Scalar field of a supported curve.
pub trait CurveScalar: PrimeField {
    const CURVE: CurveId;
}

#[cfg(feature = "bn254")]
impl SupportedCurve for ark_bn254::Bn254 {
    const ID: CurveId = CurveId::Bn254;
}

#[cfg(feature = "bn254")]
impl CurveScalar for ark_bn254::Fr {
    const CURVE: CurveId = CurveId::Bn254;
}

#[cfg(feature = "bls12-381")]
impl SupportedCurve for ark_bls12_381::Bls12_381 {
    const ID: CurveId = CurveId::Bls12_381;
}

#[cfg(feature = "bls12-381")]
impl CurveScalar for ark_bls12_381::Fr {
    const CURVE: CurveId = CurveId::Bls12_381;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tags_round_trip() {
        for id in [CurveId::Bn254, CurveId::Bls12_381] {
            assert_eq!(CurveId::from_tag(id.tag()), Some(id));
            assert_eq!(id.name().parse::<CurveId>(), Ok(id));
        }
        assert_eq!(CurveId::from_tag(0), None);
        assert!("secp256k1".parse::<CurveId>().is_err());
    }
}
