//! Witness-op trace: how each internal wire is computed.
//!
//! Every time the builder allocates an internal wire it records a [`Hint`].
//! Replaying the hints in allocation order, after the declared inputs are in
//! place, yields the full witness vector. Hints only read wires allocated
//! before their targets.

use ark_ff::{BigInteger, PrimeField};

use crate::r1cs::{LinearCombination, Variable};

/// A single witness computation recorded during circuit compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Hint<F: PrimeField> {
    /// Assign: `target = lc.evaluate(witness)`
    AssignLc {
        target: Variable,
        lc: LinearCombination<F>,
    },
    /// Multiply: `target = a.evaluate(witness) * b.evaluate(witness)`
    Multiply {
        target: Variable,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
    },
    /// Inverse: `target = 1 / operand.evaluate(witness)`, or 0 when the
    /// operand is 0 so the enforcing constraint reports the failure.
    Inverse {
        target: Variable,
        operand: LinearCombination<F>,
    },
    /// Bit extraction: target = (source >> bit_index) & 1.
    BitExtract {
        target: Variable,
        source: LinearCombination<F>,
        bit_index: usize,
    },
    /// IsZero gadget: if operand==0 then inv=0,result=1 else inv=1/operand,result=0.
    IsZero {
        operand: LinearCombination<F>,
        target_inv: Variable,
        target_result: Variable,
    },
}

impl<F: PrimeField> Hint<F> {
    /// Execute the hint, filling in its target wire(s).
    pub fn solve(&self, witness: &mut [F]) {
        match self {
            Hint::AssignLc { target, lc } => {
                witness[target.index()] = lc.evaluate(witness);
            }
            Hint::Multiply { target, a, b } => {
                witness[target.index()] = a.evaluate(witness) * b.evaluate(witness);
            }
            Hint::Inverse { target, operand } => {
                witness[target.index()] = operand.evaluate(witness).inverse().unwrap_or(F::zero());
            }
            Hint::BitExtract {
                target,
                source,
                bit_index,
            } => {
                let bits = source.evaluate(witness).into_bigint().to_bits_le();
                let bit = bits.get(*bit_index).copied().unwrap_or(false);
                witness[target.index()] = F::from(bit as u64);
            }
            Hint::IsZero {
                operand,
                target_inv,
                target_result,
            } => {
                let value = operand.evaluate(witness);
                match value.inverse() {
                    Some(inv) => {
                        witness[target_inv.index()] = inv;
                        witness[target_result.index()] = F::zero();
                    }
                    None => {
                        witness[target_inv.index()] = F::zero();
                        witness[target_result.index()] = F::one();
                    }
                }
            }
        }
    }
}
