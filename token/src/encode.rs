//! Mapping of keys and claim values into circuit field elements.

use ark_ff::PrimeField;
use constraints::circuits::ClaimCircuit;
use constraints::{Assignment, AssignmentError};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::error::TokenValidationError;
use crate::jwk::Jwk;
use crate::validate::ClaimSet;

/// SHA-256 of the key's modulus and exponent, reduced into `F`.
pub fn key_fingerprint<F: PrimeField>(key: &Jwk) -> Result<F, TokenValidationError> {
    let (n, e) = key.components()?;
    let digest = Sha256::new().chain_update(&n).chain_update(&e).finalize();
    Ok(F::from_be_bytes_mod_order(&digest))
}

/// Unsigned integers map to themselves. Anything else is hashed as
/// canonical JSON (sorted object keys, no whitespace).
pub fn encode_claim<F: PrimeField>(value: &Value) -> F {
    if let Some(n) = value.as_u64() {
        return F::from(n);
    }
    let canonical = canonical_json(value);
    F::from_be_bytes_mod_order(&Sha256::digest(canonical.as_bytes()))
}

fn canonical_json(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let body: Vec<String> = entries
                .into_iter()
                .map(|(k, v)| format!("{}:{}", Value::String(k.clone()), canonical_json(v)))
                .collect();
            format!("{{{}}}", body.join(","))
        }
        Value::Array(items) => {
            let body: Vec<String> = items.iter().map(canonical_json).collect();
            format!("[{}]", body.join(","))
        }
        scalar => scalar.to_string(),
    }
}

/// Builds the [`ClaimCircuit`] assignment from validated claims.
///
/// The signer key input is the fingerprint of `key`.
pub fn claim_assignment<F: PrimeField>(
    circuit: &ClaimCircuit,
    claims: &ClaimSet,
    key: &Jwk,
    salt: F,
) -> Result<Assignment<F>, AssignmentError> {
    let signer_key = key_fingerprint::<F>(key)?;
    let values = circuit
        .claims()
        .iter()
        .map(|name| claims.require(name).map(encode_claim::<F>))
        .collect::<Result<Vec<F>, _>>()?;
    circuit.assignment(signer_key, &values, salt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;
    use serde_json::json;

    #[test]
    fn test_integers_encode_directly() {
        assert_eq!(encode_claim::<Fr>(&json!(1_700_000_000u64)), Fr::from(1_700_000_000u64));
        assert_ne!(encode_claim::<Fr>(&json!(-1)), -Fr::from(1u64));
        assert_ne!(encode_claim::<Fr>(&json!("42")), Fr::from(42u64));
    }

    #[test]
    fn test_object_encoding_ignores_key_order() {
        let a: Value = serde_json::from_str(r#"{"b":1,"a":[true,null]}"#).unwrap();
        let b: Value = serde_json::from_str(r#"{ "a" : [true, null], "b" : 1 }"#).unwrap();
        assert_eq!(canonical_json(&a), r#"{"a":[true,null],"b":1}"#);
        assert_eq!(encode_claim::<Fr>(&a), encode_claim::<Fr>(&b));
    }

    #[test]
    fn test_fingerprint_depends_on_both_components() {
        let base = key_fingerprint::<Fr>(&Jwk::rs256(&[9; 64], &[1, 0, 1], None)).unwrap();
        let other_n = key_fingerprint::<Fr>(&Jwk::rs256(&[8; 64], &[1, 0, 1], None)).unwrap();
        let other_e = key_fingerprint::<Fr>(&Jwk::rs256(&[9; 64], &[3], None)).unwrap();
        let with_kid = key_fingerprint::<Fr>(&Jwk::rs256(&[9; 64], &[1, 0, 1], Some("k"))).unwrap();
        assert_ne!(base, other_n);
        assert_ne!(base, other_e);
        assert_eq!(base, with_kid);
    }

    #[test]
    fn test_missing_claim_is_an_assignment_error() {
        let circuit = ClaimCircuit::new(["iss", "email"], ["iss"]).unwrap();
        let claims: ClaimSet = [("iss".to_string(), json!("https://issuer.example"))]
            .into_iter()
            .collect();
        let key = Jwk::rs256(&[9; 64], &[1, 0, 1], None);
        let err = claim_assignment::<Fr>(&circuit, &claims, &key, Fr::from(5u64)).unwrap_err();
        match err {
            AssignmentError::ClaimSource(source) => {
                assert_eq!(source.to_string(), "token has no `email` claim")
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
