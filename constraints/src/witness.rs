//! Witness builder for R1CS constraint systems.
//!
//! Maps concrete values onto declared inputs, replays the hint trace to solve
//! every internal wire, and checks the result against every constraint
//! before anything reaches the prover.

use std::collections::BTreeMap;
use std::fmt;

use ark_ff::PrimeField;
use tracing::{debug, info_span};
use zeroize::Zeroize;

use crate::error::{AssignmentError, WitnessError};
use crate::r1cs::{CircuitDigest, ConstraintSystem};

// ============================================================================
// Assignment
// ============================================================================

/// Values for a circuit's declared inputs, keyed by declaration name.
///
/// Holds private inputs, so values are zeroized on drop.
#[derive(Clone, Default)]
pub struct Assignment<F: PrimeField> {
    values: BTreeMap<String, F>,
}

impl<F: PrimeField> Assignment<F> {
    pub fn new() -> Self {
        Self {
            values: BTreeMap::new(),
        }
    }

    /// Builder-style `set`.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<F>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<F>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&F> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &F)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<F: PrimeField> Drop for Assignment<F> {
    fn drop(&mut self) {
        for value in self.values.values_mut() {
            value.zeroize();
        }
    }
}

impl<F: PrimeField> fmt::Debug for Assignment<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assignment")
            .field("names", &self.values.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

// ============================================================================
// Witness
// ============================================================================

/// Full assignment of every wire (index 0 = 1) for one constraint system.
///
/// Not `Clone`; zeroized on drop.
pub struct Witness<F: PrimeField> {
    values: Vec<F>,
    public_indices: Vec<usize>,
    digest: CircuitDigest,
}

impl<F: PrimeField> Witness<F> {
    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn circuit_digest(&self) -> CircuitDigest {
        self.digest
    }

    /// Projection onto public wires, in index order.
    pub fn public(&self) -> PublicWitness<F> {
        PublicWitness {
            digest: self.digest,
            values: self.public_indices.iter().map(|&i| self.values[i]).collect(),
        }
    }
}

impl<F: PrimeField> Drop for Witness<F> {
    fn drop(&mut self) {
        self.values.zeroize();
    }
}

impl<F: PrimeField> fmt::Debug for Witness<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Witness")
            .field("len", &self.values.len())
            .field("digest", &self.digest)
            .finish_non_exhaustive()
    }
}

/// The public inputs of a witness: the only part a verifier ever sees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicWitness<F: PrimeField> {
    digest: CircuitDigest,
    values: Vec<F>,
}

impl<F: PrimeField> PublicWitness<F> {
    /// Public values agreed out of band for the circuit with `digest`.
    pub fn new(digest: CircuitDigest, values: Vec<F>) -> Self {
        Self { digest, values }
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn circuit_digest(&self) -> CircuitDigest {
        self.digest
    }
}

// ============================================================================
// build_witness
// ============================================================================

/// Generate and check the complete witness for `cs`.
///
/// Every declared input must be assigned and every assigned name must be
/// declared. Internal wires are solved by replaying the hint trace; the
/// first unsatisfied constraint is reported as a
/// [`ConstraintViolationError`](crate::error::ConstraintViolationError).
pub fn build_witness<F: PrimeField>(
    cs: &ConstraintSystem<F>,
    assignment: &Assignment<F>,
) -> Result<Witness<F>, WitnessError> {
    let _span = info_span!("build_witness", constraints = cs.num_constraints()).entered();

    if let Some(unknown) = assignment.names().find(|name| cs.lookup(name).is_none()) {
        return Err(AssignmentError::Unknown(unknown.to_string()).into());
    }

    // Allocated up front so every error path below still zeroizes on drop.
    let mut witness = Witness {
        values: vec![F::zero(); cs.num_variables()],
        public_indices: cs.public_indices(),
        digest: cs.digest(),
    };
    witness.values[0] = F::one();

    for input in cs.inputs() {
        let value = assignment
            .get(&input.name)
            .ok_or_else(|| AssignmentError::Missing(input.name.clone()))?;
        witness.values[input.variable.index()] = *value;
    }

    for hint in cs.hints() {
        hint.solve(&mut witness.values);
    }

    cs.verify(&witness.values)?;
    debug!(wires = witness.len(), public = witness.public_indices.len(), "witness built");
    Ok(witness)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConstraintViolationError;
    use crate::r1cs::LinearCombination;
    use ark_bn254::Fr;

    /// a * b = c with c public.
    fn mul_system() -> ConstraintSystem<Fr> {
        let mut cs = ConstraintSystem::new();
        let c = cs.alloc_input("c").unwrap();
        let a = cs.alloc_witness("a").unwrap();
        let b = cs.alloc_witness("b").unwrap();
        cs.enforce(
            LinearCombination::from_variable(a),
            LinearCombination::from_variable(b),
            LinearCombination::from_variable(c),
        );
        cs
    }

    #[test]
    fn test_witness_builder_roundtrip() {
        let cs = mul_system();
        let assignment = Assignment::new().with("a", 6u64).with("b", 7u64).with("c", 42u64);
        let witness = build_witness(&cs, &assignment).unwrap();
        assert_eq!(witness.len(), 4);
        assert_eq!(witness.values()[0], Fr::from(1u64));
        assert_eq!(witness.public().values(), &[Fr::from(42u64)]);
        assert_eq!(witness.public().circuit_digest(), cs.digest());
    }

    #[test]
    fn test_missing_input() {
        let cs = mul_system();
        let assignment = Assignment::new().with("a", 6u64).with("c", 42u64);
        let err = build_witness(&cs, &assignment).unwrap_err();
        assert!(matches!(err, WitnessError::Assignment(AssignmentError::Missing(ref n)) if n == "b"));
    }

    #[test]
    fn test_unknown_input() {
        let cs = mul_system();
        let assignment = Assignment::new()
            .with("a", 6u64)
            .with("b", 7u64)
            .with("c", 42u64)
            .with("d", 1u64);
        let err = build_witness(&cs, &assignment).unwrap_err();
        assert!(matches!(err, WitnessError::Assignment(AssignmentError::Unknown(ref n)) if n == "d"));
    }

    #[test]
    fn test_violation_reports_index() {
        let cs = mul_system();
        let assignment = Assignment::new().with("a", 6u64).with("b", 7u64).with("c", 43u64);
        let err = build_witness(&cs, &assignment).unwrap_err();
        assert!(matches!(
            err,
            WitnessError::ConstraintViolation(ConstraintViolationError { index: 0 })
        ));
    }

    #[test]
    fn test_debug_does_not_print_values() {
        let assignment = Assignment::<Fr>::new().with("secret", 123456789u64);
        let printed = format!("{assignment:?}");
        assert!(printed.contains("secret"));
        assert!(!printed.contains("123456789"));
    }
}
