/// R1CS Constraint System for ZK Proofs
///
/// An R1CS (Rank-1 Constraint System) represents computation as a set of
/// constraints of the form: A · B = C, where A, B, C are linear combinations
/// of variables (wires).
///
/// Wire layout:
///   Index 0     = ONE (constant wire, always 1)
///   1..         = declared inputs and intermediate wires, in allocation order
///
/// Public and private inputs may interleave; the public witness is the
/// projection onto public wires in index order.

use std::fmt;

use ark_ff::{BigInteger, PrimeField};
use rustc_hash::FxHashMap;
use sha2::{Digest, Sha256};

use crate::error::{ConstraintViolationError, WitnessError};
use crate::hint::Hint;

// ============================================================================
// Variable (Wire reference)
// ============================================================================

/// A reference to a wire in the constraint system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Variable(pub(crate) usize);

impl Variable {
    /// The constant-one wire (index 0 by R1CS convention).
    pub const ONE: Variable = Variable(0);

    /// Raw index for serialization.
    #[inline]
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Role of a wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// The constant-one wire.
    Constant,
    /// Declared input known to the verifier.
    Public,
    /// Declared input known only to the prover.
    Private,
    /// Intermediate wire allocated by the builder.
    Internal,
}

impl Visibility {
    fn tag(self) -> u8 {
        match self {
            Visibility::Constant => 0,
            Visibility::Public => 1,
            Visibility::Private => 2,
            Visibility::Internal => 3,
        }
    }
}

// ============================================================================
// LinearCombination
// ============================================================================

/// A linear combination: Σ(coefficient_i * variable_i)
///
/// Stored as sparse (variable, coefficient) pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinearCombination<F: PrimeField> {
    pub terms: Vec<(Variable, F)>,
}

impl<F: PrimeField> LinearCombination<F> {
    pub fn zero() -> Self {
        Self { terms: vec![] }
    }

    /// Create LC from a single variable with coefficient 1.
    pub fn from_variable(var: Variable) -> Self {
        Self {
            terms: vec![(var, F::one())],
        }
    }

    /// Create LC from a constant field element: coeff * ONE.
    pub fn from_constant(coeff: F) -> Self {
        if coeff.is_zero() {
            return Self::zero();
        }
        Self {
            terms: vec![(Variable::ONE, coeff)],
        }
    }

    /// Add a (coefficient * variable) term.
    pub fn add_term(&mut self, var: Variable, coeff: F) {
        self.terms.push((var, coeff));
    }

    /// Returns true if this LC only references `Variable::ONE` (i.e., it's a pure constant).
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(var, _)| *var == Variable::ONE)
    }

    /// If this LC is a pure constant (only `Variable::ONE` terms), return the scalar value.
    /// Returns `None` if any non-ONE variable is present.
    pub fn constant_value(&self) -> Option<F> {
        if !self.is_constant() {
            return None;
        }
        Some(self.terms.iter().map(|(_, coeff)| *coeff).sum())
    }

    /// If this LC is exactly `1 * var` where `var` is not the constant-one wire,
    /// return that variable. Otherwise return `None`.
    pub fn as_single_variable(&self) -> Option<Variable> {
        match self.terms.as_slice() {
            [(var, coeff)] if *var != Variable::ONE && coeff.is_one() => Some(*var),
            _ => None,
        }
    }

    /// Canonical form: terms sorted by variable index, duplicates merged,
    /// zero coefficients dropped.
    pub fn compact(mut self) -> Self {
        self.terms.sort_by_key(|(var, _)| *var);
        let mut merged: Vec<(Variable, F)> = Vec::with_capacity(self.terms.len());
        for (var, coeff) in self.terms {
            match merged.last_mut() {
                Some((last, acc)) if *last == var => *acc += coeff,
                _ => merged.push((var, coeff)),
            }
        }
        merged.retain(|(_, coeff)| !coeff.is_zero());
        Self { terms: merged }
    }

    /// Evaluate the LC given a full witness assignment.
    /// witness[i] = value of variable i.
    pub fn evaluate(&self, witness: &[F]) -> F {
        self.terms
            .iter()
            .map(|(var, coeff)| *coeff * witness[var.0])
            .sum()
    }

    /// Largest variable index referenced, if any.
    pub(crate) fn max_index(&self) -> Option<usize> {
        self.terms.iter().map(|(var, _)| var.0).max()
    }
}

impl<F: PrimeField> From<Variable> for LinearCombination<F> {
    fn from(var: Variable) -> Self {
        Self::from_variable(var)
    }
}

// ============================================================================
// Arithmetic on LinearCombinations
// ============================================================================

impl<F: PrimeField> std::ops::Add for LinearCombination<F> {
    type Output = Self;
    fn add(mut self, rhs: Self) -> Self {
        self.terms.extend(rhs.terms);
        self
    }
}

impl<F: PrimeField> std::ops::Sub for LinearCombination<F> {
    type Output = Self;
    fn sub(mut self, rhs: Self) -> Self {
        for (var, coeff) in rhs.terms {
            self.terms.push((var, -coeff));
        }
        self
    }
}

impl<F: PrimeField> std::ops::Neg for LinearCombination<F> {
    type Output = Self;
    fn neg(mut self) -> Self {
        for (_, coeff) in &mut self.terms {
            *coeff = -*coeff;
        }
        self
    }
}

/// Scalar multiplication: coeff * LC
impl<F: PrimeField> std::ops::Mul<F> for LinearCombination<F> {
    type Output = Self;
    fn mul(mut self, scalar: F) -> Self {
        for (_, coeff) in &mut self.terms {
            *coeff *= scalar;
        }
        self
    }
}

// ============================================================================
// R1CS Constraint
// ============================================================================

/// A single R1CS constraint: A · B = C
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint<F: PrimeField> {
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
}

impl<F: PrimeField> Constraint<F> {
    /// Whether `A·B = C` holds for the given assignment.
    pub fn is_satisfied(&self, witness: &[F]) -> bool {
        self.a.evaluate(witness) * self.b.evaluate(witness) == self.c.evaluate(witness)
    }

    /// For constraints over constants only: `Some(true|false)`.
    pub fn constant_truth(&self) -> Option<bool> {
        let a = self.a.constant_value()?;
        let b = self.b.constant_value()?;
        let c = self.c.constant_value()?;
        Some(a * b == c)
    }
}

// ============================================================================
// Circuit digest
// ============================================================================

/// SHA-256 fingerprint of a constraint system's structure.
///
/// Keys, witnesses and public witnesses carry the digest of the system they
/// belong to.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct CircuitDigest(pub [u8; 32]);

impl CircuitDigest {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Short hex prefix for log lines.
    pub fn short(&self) -> String {
        self.0[..6].iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl fmt::Display for CircuitDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for CircuitDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CircuitDigest({})", self.short())
    }
}

// ============================================================================
// ConstraintSystem
// ============================================================================

/// A named input declared by a circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredInput {
    pub name: String,
    pub variable: Variable,
    pub visibility: Visibility,
}

/// The main R1CS constraint system.
///
/// Manages variable allocation, constraint collection, the witness-op trace
/// used to solve intermediate wires, and witness verification.
#[derive(Debug, Clone)]
pub struct ConstraintSystem<F: PrimeField> {
    /// Role of every wire, including ONE at index 0.
    layout: Vec<Visibility>,
    /// Number of public input variables.
    num_pub_inputs: usize,
    /// Declared inputs in declaration order.
    inputs: Vec<DeclaredInput>,
    names: FxHashMap<String, Variable>,
    /// All constraints: each is (A, B, C) with A * B = C.
    constraints: Vec<Constraint<F>>,
    /// Solver trace for internal wires, in allocation order.
    hints: Vec<Hint<F>>,
}

impl<F: PrimeField> Default for ConstraintSystem<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> ConstraintSystem<F> {
    pub fn new() -> Self {
        Self {
            // Variable 0 = ONE (constant wire)
            layout: vec![Visibility::Constant],
            num_pub_inputs: 0,
            inputs: Vec::new(),
            names: FxHashMap::default(),
            constraints: Vec::new(),
            hints: Vec::new(),
        }
    }

    // --- Variable allocation ---

    fn alloc(&mut self, visibility: Visibility) -> Variable {
        let var = Variable(self.layout.len());
        self.layout.push(visibility);
        var
    }

    fn alloc_named(&mut self, name: String, visibility: Visibility) -> Option<Variable> {
        if self.names.contains_key(&name) {
            return None;
        }
        let variable = self.alloc(visibility);
        self.names.insert(name.clone(), variable);
        self.inputs.push(DeclaredInput {
            name,
            variable,
            visibility,
        });
        Some(variable)
    }

    /// Allocate a named public input variable. Returns `None` if the name is taken.
    pub fn alloc_input(&mut self, name: impl Into<String>) -> Option<Variable> {
        let var = self.alloc_named(name.into(), Visibility::Public)?;
        self.num_pub_inputs += 1;
        Some(var)
    }

    /// Allocate a named private input variable. Returns `None` if the name is taken.
    pub fn alloc_witness(&mut self, name: impl Into<String>) -> Option<Variable> {
        self.alloc_named(name.into(), Visibility::Private)
    }

    /// Allocate an intermediate wire. Pair it with a [`Hint`] via
    /// [`push_hint`](Self::push_hint) so the witness builder can solve it.
    pub fn alloc_internal(&mut self) -> Variable {
        self.alloc(Visibility::Internal)
    }

    /// Record how to compute one or more internal wires.
    pub fn push_hint(&mut self, hint: Hint<F>) {
        self.hints.push(hint);
    }

    // --- Constraint enforcement ---

    /// Add a constraint: A * B = C
    pub fn enforce(
        &mut self,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) {
        self.constraints.push(Constraint {
            a: a.compact(),
            b: b.compact(),
            c: c.compact(),
        });
    }

    /// To constrain x = y: enforce(x, 1, y) → x*1 = y.
    pub fn enforce_equal(&mut self, x: LinearCombination<F>, y: LinearCombination<F>) {
        self.enforce(x, LinearCombination::from_variable(Variable::ONE), y);
    }

    // --- Queries ---

    /// Total number of variables (including ONE).
    pub fn num_variables(&self) -> usize {
        self.layout.len()
    }

    /// Number of public inputs.
    pub fn num_pub_inputs(&self) -> usize {
        self.num_pub_inputs
    }

    /// Number of constraints.
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Access constraints for serialization or verification.
    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    pub fn hints(&self) -> &[Hint<F>] {
        &self.hints
    }

    /// Declared inputs in declaration order.
    pub fn inputs(&self) -> &[DeclaredInput] {
        &self.inputs
    }

    pub fn lookup(&self, name: &str) -> Option<Variable> {
        self.names.get(name).copied()
    }

    pub fn visibility(&self, var: Variable) -> Option<Visibility> {
        self.layout.get(var.0).copied()
    }

    /// Role of every wire in index order.
    pub fn layout(&self) -> &[Visibility] {
        &self.layout
    }

    /// Indices of public wires in index order.
    pub fn public_indices(&self) -> Vec<usize> {
        self.layout
            .iter()
            .enumerate()
            .filter(|(_, v)| **v == Visibility::Public)
            .map(|(i, _)| i)
            .collect()
    }

    /// Every constraint references only allocated wires.
    pub fn is_well_formed(&self) -> bool {
        let n = self.num_variables();
        self.constraints.iter().all(|c| {
            [&c.a, &c.b, &c.c]
                .iter()
                .all(|lc| lc.max_index().map_or(true, |i| i < n))
        })
    }

    /// Index of the first constraint over constants only that can never hold.
    pub fn first_unsatisfiable(&self) -> Option<usize> {
        self.constraints
            .iter()
            .position(|c| c.constant_truth() == Some(false))
    }

    /// Structural fingerprint: field modulus, layout, names, constraints.
    pub fn digest(&self) -> CircuitDigest {
        let mut hasher = Sha256::new();
        // Version salt, bump when the hashed structure changes
        hasher.update(b"zkid-circuit-digest-v1");
        hasher.update(F::MODULUS.to_bytes_le());
        hasher.update((self.layout.len() as u64).to_le_bytes());
        hasher.update(self.layout.iter().map(|v| v.tag()).collect::<Vec<u8>>());
        hasher.update((self.inputs.len() as u64).to_le_bytes());
        for input in &self.inputs {
            hasher.update((input.name.len() as u64).to_le_bytes());
            hasher.update(input.name.as_bytes());
            hasher.update((input.variable.0 as u64).to_le_bytes());
        }
        hasher.update((self.constraints.len() as u64).to_le_bytes());
        for c in &self.constraints {
            hash_lc(&mut hasher, &c.a);
            hash_lc(&mut hasher, &c.b);
            hash_lc(&mut hasher, &c.c);
        }
        CircuitDigest(hasher.finalize().into())
    }

    // --- Verification ---

    /// Verify that a witness satisfies all constraints.
    ///
    /// witness[0] must be ONE. Reports the index of the first failing
    /// constraint.
    pub fn verify(&self, witness: &[F]) -> Result<(), WitnessError> {
        if witness.len() != self.num_variables() {
            return Err(WitnessError::WrongLength {
                expected: self.num_variables(),
                actual: witness.len(),
            });
        }
        if !witness[0].is_one() {
            return Err(WitnessError::MissingOne);
        }
        match first_failing(&self.constraints, witness) {
            Some(index) => Err(ConstraintViolationError { index }.into()),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "parallel")]
fn first_failing<F: PrimeField>(constraints: &[Constraint<F>], witness: &[F]) -> Option<usize> {
    use rayon::prelude::*;
    constraints
        .par_iter()
        .position_first(|c| !c.is_satisfied(witness))
}

#[cfg(not(feature = "parallel"))]
fn first_failing<F: PrimeField>(constraints: &[Constraint<F>], witness: &[F]) -> Option<usize> {
    constraints.iter().position(|c| !c.is_satisfied(witness))
}

fn hash_lc<F: PrimeField>(hasher: &mut Sha256, lc: &LinearCombination<F>) {
    hasher.update((lc.terms.len() as u64).to_le_bytes());
    for (var, coeff) in &lc.terms {
        hasher.update((var.0 as u64).to_le_bytes());
        hasher.update(coeff.into_bigint().to_bytes_le());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ark_bn254::Fr;

    fn fe(n: u64) -> Fr {
        Fr::from(n)
    }

    #[test]
    fn test_simple_multiplication_constraint() {
        // Circuit: prove knowledge of a, b such that a * b = c (public)
        let mut cs = ConstraintSystem::<Fr>::new();
        let c = cs.alloc_input("c").unwrap(); // index 1
        let a = cs.alloc_witness("a").unwrap(); // index 2
        let b = cs.alloc_witness("b").unwrap(); // index 3

        cs.enforce(a.into(), b.into(), c.into());

        assert_eq!(cs.num_variables(), 4); // ONE, c, a, b
        assert_eq!(cs.num_pub_inputs(), 1);
        assert_eq!(cs.num_constraints(), 1);
        assert_eq!(cs.public_indices(), vec![1]);

        let witness = vec![Fr::from(1u64), fe(42), fe(6), fe(7)];
        assert!(cs.verify(&witness).is_ok());
    }

    #[test]
    fn test_failing_constraint() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let c = cs.alloc_input("c").unwrap();
        let a = cs.alloc_witness("a").unwrap();
        let b = cs.alloc_witness("b").unwrap();
        cs.enforce(a.into(), b.into(), c.into());

        // Wrong witness: 6 * 7 != 43
        let witness = vec![fe(1), fe(43), fe(6), fe(7)];
        assert!(matches!(
            cs.verify(&witness),
            Err(WitnessError::ConstraintViolation(ConstraintViolationError { index: 0 }))
        ));
    }

    #[test]
    fn test_verify_rejects_malformed_vector() {
        let mut cs = ConstraintSystem::<Fr>::new();
        cs.alloc_input("c").unwrap();
        assert!(matches!(
            cs.verify(&[fe(1)]),
            Err(WitnessError::WrongLength { expected: 2, actual: 1 })
        ));
        assert!(matches!(cs.verify(&[]), Err(WitnessError::WrongLength { expected: 2, actual: 0 })));
        assert!(matches!(cs.verify(&[fe(2), fe(0)]), Err(WitnessError::MissingOne)));
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let mut cs = ConstraintSystem::<Fr>::new();
        assert!(cs.alloc_input("x").is_some());
        assert!(cs.alloc_witness("x").is_none());
        assert_eq!(cs.num_variables(), 2);
    }

    #[test]
    fn test_linear_combination_evaluate() {
        // LC: 3*x + 5*y
        let mut lc = LinearCombination::<Fr>::zero();
        lc.add_term(Variable(1), fe(3));
        lc.add_term(Variable(2), fe(5));

        let witness = vec![fe(1), fe(10), fe(4)];
        // 3*10 + 5*4 = 50
        assert_eq!(lc.evaluate(&witness), fe(50));
    }

    #[test]
    fn test_compact_merges_and_drops() {
        let x = Variable(2);
        let y = Variable(1);
        let lc = LinearCombination::<Fr>::from_variable(x)
            + LinearCombination::from_variable(y)
            - LinearCombination::from_variable(x)
            + LinearCombination::from_variable(y);
        let lc = lc.compact();
        assert_eq!(lc.terms, vec![(y, fe(2))]);
    }

    #[test]
    fn test_enforce_equal() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_witness("x").unwrap();
        let y = cs.alloc_witness("y").unwrap();
        cs.enforce_equal(x.into(), y.into());

        assert!(cs.verify(&[fe(1), fe(7), fe(7)]).is_ok());
        assert!(cs.verify(&[fe(1), fe(7), fe(8)]).is_err());
    }

    #[test]
    fn test_constant_lc_is_constant() {
        let lc = LinearCombination::from_constant(fe(42));
        assert!(lc.is_constant());
        assert_eq!(lc.constant_value(), Some(fe(42)));

        let zero = LinearCombination::<Fr>::zero();
        assert!(zero.is_constant());
        assert_eq!(zero.constant_value(), Some(fe(0)));
    }

    #[test]
    fn test_mixed_lc_not_constant() {
        let mut lc = LinearCombination::from_constant(fe(5));
        lc.add_term(Variable(1), fe(1));
        assert!(!lc.is_constant());
        assert_eq!(lc.constant_value(), None);
        assert_eq!(lc.as_single_variable(), None);
        assert_eq!(
            LinearCombination::<Fr>::from_variable(Variable(3)).as_single_variable(),
            Some(Variable(3))
        );
    }

    #[test]
    fn test_constant_truth() {
        let ok = Constraint {
            a: LinearCombination::from_constant(fe(2)),
            b: LinearCombination::from_constant(fe(3)),
            c: LinearCombination::from_constant(fe(6)),
        };
        let bad = Constraint {
            c: LinearCombination::from_constant(fe(7)),
            ..ok.clone()
        };
        assert_eq!(ok.constant_truth(), Some(true));
        assert_eq!(bad.constant_truth(), Some(false));

        let mut cs = ConstraintSystem::<Fr>::new();
        cs.enforce(ok.a, ok.b, ok.c);
        cs.enforce(bad.a, bad.b, bad.c);
        assert_eq!(cs.first_unsatisfiable(), Some(1));
    }

    #[test]
    fn test_digest_is_structural() {
        let build = |coeff: u64| {
            let mut cs = ConstraintSystem::<Fr>::new();
            let y = cs.alloc_input("y").unwrap();
            let x = cs.alloc_witness("x").unwrap();
            cs.enforce_equal(LinearCombination::from_variable(x) * fe(coeff), y.into());
            cs
        };
        assert_eq!(build(3).digest(), build(3).digest());
        assert_ne!(build(3).digest(), build(4).digest());
    }

    #[test]
    fn test_digest_separates_fields() {
        let mut bn = ConstraintSystem::<Fr>::new();
        bn.alloc_input("y").unwrap();
        let mut bls = ConstraintSystem::<ark_bls12_381::Fr>::new();
        bls.alloc_input("y").unwrap();
        assert_ne!(bn.digest(), bls.digest());
    }
}
