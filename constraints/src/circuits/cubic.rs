use ark_ff::PrimeField;

use crate::builder::{Circuit, CircuitApi, Declarations};
use crate::error::CircuitDefinitionError;
use crate::r1cs::Variable;
use crate::witness::Assignment;

/// Knowledge of a private `x` with `x³ + x + 5 == y` for a public `y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CubicCircuit;

impl CubicCircuit {
    pub fn assignment<F: PrimeField>(x: impl Into<F>, y: impl Into<F>) -> Assignment<F> {
        Assignment::new().with("x", x).with("y", y)
    }

    /// `x³ + x + 5`, evaluated natively.
    pub fn evaluate<F: PrimeField>(x: F) -> F {
        x * x * x + x + F::from(5u64)
    }
}

impl<F: PrimeField> Circuit<F> for CubicCircuit {
    type Wires = (Variable, Variable);

    fn declare(&self, vars: &mut Declarations<'_, F>) -> Result<Self::Wires, CircuitDefinitionError> {
        let x = vars.private("x")?;
        let y = vars.public("y")?;
        Ok((x, y))
    }

    fn define(&self, api: &mut CircuitApi<'_, F>, &(x, y): &Self::Wires) -> Result<(), CircuitDefinitionError> {
        let x3 = api.product([x, x, x]);
        let lhs = api.add(x3, x);
        let lhs = api.add_constant(lhs, 5u64);
        api.assert_equal(y, lhs)
    }
}
