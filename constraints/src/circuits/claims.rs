//! Selective disclosure of identity-token claims.
//!
//! The prover holds the claims of a token signed by `signer_key` and shows
//! that
//! - the signer is the issuer the verifier trusts (`issuer_key`),
//! - each disclosed value is the claim it stands for,
//! - `commitment` binds the signer, every claim and a private salt.
//!
//! Undisclosed claims stay private. The token signature itself is checked
//! outside the circuit before the assignment is built.

use ark_ff::PrimeField;

use crate::builder::{Circuit, CircuitApi, Declarations};
use crate::error::{AssignmentError, CircuitDefinitionError};
use crate::poseidon;
use crate::r1cs::{LinearCombination, Variable};
use crate::witness::Assignment;

/// Shape of a claim statement: which claims, and which are disclosed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimCircuit {
    claims: Vec<String>,
    /// Indices into `claims`, in disclosure order.
    disclosed: Vec<usize>,
}

#[derive(Debug)]
pub struct ClaimWires {
    issuer_key: Variable,
    signer_key: Variable,
    claims: Vec<Variable>,
    salt: Variable,
    disclosed: Vec<Variable>,
    commitment: Variable,
}

impl ClaimCircuit {
    pub fn new<S, D>(
        claims: impl IntoIterator<Item = S>,
        disclose: impl IntoIterator<Item = D>,
    ) -> Result<Self, CircuitDefinitionError>
    where
        S: Into<String>,
        D: AsRef<str>,
    {
        let claims: Vec<String> = claims.into_iter().map(Into::into).collect();
        if claims.is_empty() {
            return Err(CircuitDefinitionError::InvalidShape("at least one claim is required".into()));
        }
        for (i, name) in claims.iter().enumerate() {
            if name.is_empty() {
                return Err(CircuitDefinitionError::EmptyName);
            }
            if claims[..i].contains(name) {
                return Err(CircuitDefinitionError::InvalidShape(format!("claim `{name}` listed twice")));
            }
        }

        let mut disclosed = Vec::new();
        for name in disclose {
            let name = name.as_ref();
            let index = claims.iter().position(|c| c == name).ok_or_else(|| {
                CircuitDefinitionError::InvalidShape(format!("disclosed claim `{name}` is not a claim"))
            })?;
            if disclosed.contains(&index) {
                return Err(CircuitDefinitionError::InvalidShape(format!("claim `{name}` disclosed twice")));
            }
            disclosed.push(index);
        }
        Ok(Self { claims, disclosed })
    }

    pub fn claims(&self) -> &[String] {
        &self.claims
    }

    pub fn disclosed(&self) -> impl Iterator<Item = &str> {
        self.disclosed.iter().map(|&i| self.claims[i].as_str())
    }

    /// Native commitment: `Poseidon(signer_key, claims.., salt)`.
    pub fn commitment<F: PrimeField>(signer_key: F, claims: &[F], salt: F) -> F {
        let mut preimage = Vec::with_capacity(claims.len() + 2);
        preimage.push(signer_key);
        preimage.extend_from_slice(claims);
        preimage.push(salt);
        poseidon::hash(&poseidon::params::<F>(), &preimage)
    }

    /// Assignment for claim values given in `claims()` order.
    ///
    /// The public side (issuer key, disclosed values, commitment) is derived
    /// from the private side.
    pub fn assignment<F: PrimeField>(
        &self,
        signer_key: F,
        claims: &[F],
        salt: F,
    ) -> Result<Assignment<F>, AssignmentError> {
        if claims.len() < self.claims.len() {
            return Err(AssignmentError::Missing(format!("claim[{}]", claims.len())));
        }
        if claims.len() > self.claims.len() {
            return Err(AssignmentError::Unknown(format!("claim[{}]", self.claims.len())));
        }

        let mut assignment = Assignment::new()
            .with("issuer_key", signer_key)
            .with("signer_key", signer_key)
            .with("salt", salt)
            .with("commitment", Self::commitment(signer_key, claims, salt));
        for (i, value) in claims.iter().enumerate() {
            assignment.set(format!("claim[{i}]"), *value);
        }
        for (j, &i) in self.disclosed.iter().enumerate() {
            assignment.set(format!("disclosed[{j}]"), claims[i]);
        }
        Ok(assignment)
    }
}

impl<F: PrimeField> Circuit<F> for ClaimCircuit {
    type Wires = ClaimWires;

    fn declare(&self, vars: &mut Declarations<'_, F>) -> Result<ClaimWires, CircuitDefinitionError> {
        Ok(ClaimWires {
            issuer_key: vars.public("issuer_key")?,
            signer_key: vars.private("signer_key")?,
            claims: vars.private_array("claim", self.claims.len())?,
            salt: vars.private("salt")?,
            disclosed: vars.public_array("disclosed", self.disclosed.len())?,
            commitment: vars.public("commitment")?,
        })
    }

    fn define(&self, api: &mut CircuitApi<'_, F>, w: &ClaimWires) -> Result<(), CircuitDefinitionError> {
        api.assert_equal(w.signer_key, w.issuer_key)?;

        for (&claim, &public) in self.disclosed.iter().zip(&w.disclosed) {
            api.assert_equal(w.claims[claim], public)?;
        }

        let preimage: Vec<LinearCombination<F>> = std::iter::once(w.signer_key)
            .chain(w.claims.iter().copied())
            .chain(std::iter::once(w.salt))
            .map(LinearCombination::from_variable)
            .collect();
        let digest = poseidon::hash_gadget(api, &poseidon::params::<F>(), &preimage);
        api.assert_equal(digest, w.commitment)
    }
}
