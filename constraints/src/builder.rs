//! Circuit trait and the constraint-system builder.
//!
//! A [`Circuit`] declares its inputs once through [`Declarations`] and then
//! records its relation through [`CircuitApi`]. [`compile`] drives both
//! steps and returns the sealed, shareable [`ConstraintSystem`].

use std::sync::Arc;

use ark_ff::{BigInteger, PrimeField};
use tracing::{debug, info_span, warn};

use crate::error::CircuitDefinitionError;
use crate::hint::Hint;
use crate::r1cs::{ConstraintSystem, LinearCombination, Variable, Visibility};

/// A statement to be proved.
///
/// `declare` allocates the public and private inputs (in declaration order)
/// and returns the typed handles the circuit needs; `define` turns them into
/// constraints. Both must be pure: the same circuit value always yields the
/// same constraint system.
pub trait Circuit<F: PrimeField> {
    type Wires;

    fn declare(&self, vars: &mut Declarations<'_, F>) -> Result<Self::Wires, CircuitDefinitionError>;

    fn define(
        &self,
        api: &mut CircuitApi<'_, F>,
        wires: &Self::Wires,
    ) -> Result<(), CircuitDefinitionError>;
}

/// Compile a circuit into an immutable constraint system.
pub fn compile<F, C>(circuit: &C) -> Result<Arc<ConstraintSystem<F>>, CircuitDefinitionError>
where
    F: PrimeField,
    C: Circuit<F>,
{
    let _span = info_span!("compile").entered();
    let mut cs = ConstraintSystem::new();
    let wires = circuit.declare(&mut Declarations { cs: &mut cs })?;
    circuit.define(&mut CircuitApi { cs: &mut cs }, &wires)?;

    report_unconstrained(&cs);
    debug!(
        constraints = cs.num_constraints(),
        variables = cs.num_variables(),
        public = cs.num_pub_inputs(),
        "circuit compiled"
    );
    Ok(Arc::new(cs))
}

/// Canonical form of an operand.
fn lc<F: PrimeField>(a: impl Into<LinearCombination<F>>) -> LinearCombination<F> {
    let a: LinearCombination<F> = a.into();
    a.compact()
}

/// Warn about declared inputs that no constraint mentions.
fn report_unconstrained<F: PrimeField>(cs: &ConstraintSystem<F>) {
    let mut used = vec![false; cs.num_variables()];
    for c in cs.constraints() {
        for lc in [&c.a, &c.b, &c.c] {
            for (var, _) in &lc.terms {
                used[var.index()] = true;
            }
        }
    }
    for input in cs.inputs() {
        if !used[input.variable.index()] {
            warn!(input = %input.name, "declared input is not constrained");
        }
    }
}

// ============================================================================
// Declarations
// ============================================================================

/// Allocates declared inputs. Indices follow declaration order.
pub struct Declarations<'a, F: PrimeField> {
    cs: &'a mut ConstraintSystem<F>,
}

impl<F: PrimeField> Declarations<'_, F> {
    fn declare(&mut self, name: String, visibility: Visibility) -> Result<Variable, CircuitDefinitionError> {
        if name.is_empty() {
            return Err(CircuitDefinitionError::EmptyName);
        }
        let var = match visibility {
            Visibility::Public => self.cs.alloc_input(name.clone()),
            _ => self.cs.alloc_witness(name.clone()),
        };
        var.ok_or(CircuitDefinitionError::DuplicateVariable(name))
    }

    pub fn public(&mut self, name: impl Into<String>) -> Result<Variable, CircuitDefinitionError> {
        self.declare(name.into(), Visibility::Public)
    }

    pub fn private(&mut self, name: impl Into<String>) -> Result<Variable, CircuitDefinitionError> {
        self.declare(name.into(), Visibility::Private)
    }

    /// Declares `name[0]`..`name[len-1]` as public inputs.
    pub fn public_array(&mut self, name: &str, len: usize) -> Result<Vec<Variable>, CircuitDefinitionError> {
        (0..len).map(|i| self.public(format!("{name}[{i}]"))).collect()
    }

    /// Declares `name[0]`..`name[len-1]` as private inputs.
    pub fn private_array(&mut self, name: &str, len: usize) -> Result<Vec<Variable>, CircuitDefinitionError> {
        (0..len).map(|i| self.private(format!("{name}[{i}]"))).collect()
    }
}

// ============================================================================
// CircuitApi
// ============================================================================

/// Records arithmetic and assertions as R1CS constraints.
///
/// Linear operations only build linear combinations. Multiplications of two
/// non-constant operands allocate an internal wire, a constraint and a
/// [`Hint`] for the witness builder.
pub struct CircuitApi<'a, F: PrimeField> {
    cs: &'a mut ConstraintSystem<F>,
}

impl<F: PrimeField> CircuitApi<'_, F> {
    /// The constraint system built so far.
    pub fn cs(&self) -> &ConstraintSystem<F> {
        self.cs
    }

    pub fn constant(&self, value: impl Into<F>) -> LinearCombination<F> {
        LinearCombination::from_constant(value.into())
    }

    // --- Linear ---

    pub fn add(
        &self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> LinearCombination<F> {
        (lc(a) + lc(b)).compact()
    }

    pub fn sub(
        &self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> LinearCombination<F> {
        (lc(a) - lc(b)).compact()
    }

    pub fn neg(&self, a: impl Into<LinearCombination<F>>) -> LinearCombination<F> {
        -lc(a)
    }

    pub fn scale(&self, a: impl Into<LinearCombination<F>>, k: impl Into<F>) -> LinearCombination<F> {
        let k: F = k.into();
        (lc(a) * k).compact()
    }

    pub fn add_constant(&self, a: impl Into<LinearCombination<F>>, k: impl Into<F>) -> LinearCombination<F> {
        (lc(a) + LinearCombination::from_constant(k.into())).compact()
    }

    /// Σ terms.
    pub fn sum<I, T>(&self, terms: I) -> LinearCombination<F>
    where
        I: IntoIterator<Item = T>,
        T: Into<LinearCombination<F>>,
    {
        terms
            .into_iter()
            .fold(LinearCombination::zero(), |acc, t| acc + lc(t))
            .compact()
    }

    /// Σ 2^i · bits[i].
    pub fn from_bits(&self, bits: &[LinearCombination<F>]) -> LinearCombination<F> {
        let mut acc = LinearCombination::zero();
        let mut weight = F::one();
        for bit in bits {
            acc = acc + bit.clone() * weight;
            weight.double_in_place();
        }
        acc.compact()
    }

    // --- Multiplicative ---

    pub fn mul(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> LinearCombination<F> {
        let a = lc(a);
        let b = lc(b);
        if let Some(k) = a.constant_value() {
            return (b * k).compact();
        }
        if let Some(k) = b.constant_value() {
            return (a * k).compact();
        }
        let out = self.cs.alloc_internal();
        self.cs.push_hint(Hint::Multiply {
            target: out,
            a: a.clone(),
            b: b.clone(),
        });
        self.cs.enforce(a, b, out.into());
        out.into()
    }

    pub fn square(&mut self, a: impl Into<LinearCombination<F>>) -> LinearCombination<F> {
        let a = lc(a);
        self.mul(a.clone(), a)
    }

    /// Product of all factors; the empty product is 1.
    pub fn product<I, T>(&mut self, factors: I) -> LinearCombination<F>
    where
        I: IntoIterator<Item = T>,
        T: Into<LinearCombination<F>>,
    {
        let mut acc = LinearCombination::from_constant(F::one());
        for factor in factors {
            acc = self.mul(acc, factor);
        }
        acc
    }

    /// `1 / a`, with `a · inv = 1` enforced.
    pub fn inverse(
        &mut self,
        a: impl Into<LinearCombination<F>>,
    ) -> Result<LinearCombination<F>, CircuitDefinitionError> {
        let a = lc(a);
        if let Some(k) = a.constant_value() {
            let inv = k.inverse().ok_or(CircuitDefinitionError::DivisionByZero)?;
            return Ok(LinearCombination::from_constant(inv));
        }
        let inv = self.cs.alloc_internal();
        self.cs.push_hint(Hint::Inverse {
            target: inv,
            operand: a.clone(),
        });
        self.cs.enforce(a, inv.into(), LinearCombination::from_constant(F::one()));
        Ok(inv.into())
    }

    /// `a / b`; `b` is constrained to be non-zero.
    pub fn div(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> Result<LinearCombination<F>, CircuitDefinitionError> {
        let inv = self.inverse(b)?;
        Ok(self.mul(a, inv))
    }

    // --- Assertions ---

    /// Raw constraint `a · b = c`.
    pub fn enforce(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
        c: impl Into<LinearCombination<F>>,
    ) -> Result<(), CircuitDefinitionError> {
        let (a, b, c) = (lc(a), lc(b), lc(c));
        if let (Some(x), Some(y), Some(z)) = (a.constant_value(), b.constant_value(), c.constant_value()) {
            return if x * y == z {
                Ok(())
            } else {
                Err(CircuitDefinitionError::ContradictoryConstants { context: "enforce" })
            };
        }
        self.cs.enforce(a, b, c);
        Ok(())
    }

    pub fn assert_equal(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> Result<(), CircuitDefinitionError> {
        let (a, b) = (lc(a), lc(b));
        match (a.constant_value(), b.constant_value()) {
            (Some(x), Some(y)) if x == y => Ok(()),
            (Some(_), Some(_)) => Err(CircuitDefinitionError::ContradictoryConstants {
                context: "assert_equal",
            }),
            _ => {
                self.cs.enforce_equal(a, b);
                Ok(())
            }
        }
    }

    /// `a · (1 − a) = 0`.
    pub fn assert_boolean(&mut self, a: impl Into<LinearCombination<F>>) -> Result<(), CircuitDefinitionError> {
        let a = lc(a);
        if let Some(k) = a.constant_value() {
            return if k.is_zero() || k.is_one() {
                Ok(())
            } else {
                Err(CircuitDefinitionError::NonBooleanConstant)
            };
        }
        let one_minus = LinearCombination::from_constant(F::one()) - a.clone();
        self.cs.enforce(a, one_minus, LinearCombination::zero());
        Ok(())
    }

    pub fn assert_nonzero(&mut self, a: impl Into<LinearCombination<F>>) -> Result<(), CircuitDefinitionError> {
        let a = lc(a);
        if a.constant_value().is_some_and(|k| k.is_zero()) {
            return Err(CircuitDefinitionError::ContradictoryConstants {
                context: "assert_nonzero",
            });
        }
        self.inverse(a).map(|_| ())
    }

    // --- Comparisons and selection ---

    /// 1 if `a == 0`, else 0.
    ///
    /// Constraints: `a · inv = 1 − r` and `a · r = 0`.
    pub fn is_zero(&mut self, a: impl Into<LinearCombination<F>>) -> LinearCombination<F> {
        let a = lc(a);
        if let Some(k) = a.constant_value() {
            return LinearCombination::from_constant(F::from(k.is_zero() as u64));
        }
        let inv = self.cs.alloc_internal();
        let r = self.cs.alloc_internal();
        self.cs.push_hint(Hint::IsZero {
            operand: a.clone(),
            target_inv: inv,
            target_result: r,
        });
        let one_minus_r = LinearCombination::from_constant(F::one()) - r.into();
        self.cs.enforce(a.clone(), inv.into(), one_minus_r);
        self.cs.enforce(a, r.into(), LinearCombination::zero());
        r.into()
    }

    pub fn is_equal(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> LinearCombination<F> {
        let diff = self.sub(a, b);
        self.is_zero(diff)
    }

    /// `cond ? a : b`, with `cond` constrained boolean.
    pub fn select(
        &mut self,
        cond: impl Into<LinearCombination<F>>,
        a: impl Into<LinearCombination<F>>,
        b: impl Into<LinearCombination<F>>,
    ) -> Result<LinearCombination<F>, CircuitDefinitionError> {
        let cond = lc(cond);
        let (a, b) = (lc(a), lc(b));
        self.assert_boolean(cond.clone())?;
        if let Some(k) = cond.constant_value() {
            return Ok(if k.is_one() { a } else { b });
        }
        let diff = self.sub(a, b.clone());
        let picked = self.mul(cond, diff);
        Ok(self.add(b, picked))
    }

    /// Little-endian bit decomposition of `a` into `n` boolean wires.
    ///
    /// `n` is capped below the field size so the decomposition is unique.
    pub fn to_bits(
        &mut self,
        a: impl Into<LinearCombination<F>>,
        n: usize,
    ) -> Result<Vec<LinearCombination<F>>, CircuitDefinitionError> {
        let max = F::MODULUS_BIT_SIZE as usize - 1;
        if n > max {
            return Err(CircuitDefinitionError::BitWidth { requested: n, max });
        }
        let a = lc(a);
        if let Some(k) = a.constant_value() {
            let bits = k.into_bigint().to_bits_le();
            if bits.iter().skip(n).any(|b| *b) {
                return Err(CircuitDefinitionError::ContradictoryConstants { context: "to_bits" });
            }
            return Ok((0..n)
                .map(|i| LinearCombination::from_constant(F::from(bits[i] as u64)))
                .collect());
        }

        let mut bits = Vec::with_capacity(n);
        for bit_index in 0..n {
            let bit = self.cs.alloc_internal();
            self.cs.push_hint(Hint::BitExtract {
                target: bit,
                source: a.clone(),
                bit_index,
            });
            self.assert_boolean(bit)?;
            bits.push(LinearCombination::from_variable(bit));
        }
        let recomposed = self.from_bits(&bits);
        self.assert_equal(recomposed, a)?;
        Ok(bits)
    }

    /// Bind `a` to a single wire so later operations reference one term.
    pub fn materialize(&mut self, a: impl Into<LinearCombination<F>>) -> Variable {
        let a = lc(a);
        if let Some(var) = a.as_single_variable() {
            return var;
        }
        let out = self.cs.alloc_internal();
        self.cs.push_hint(Hint::AssignLc {
            target: out,
            lc: a.clone(),
        });
        self.cs.enforce_equal(a, out.into());
        out
    }
}
