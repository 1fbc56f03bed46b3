//! Bridge from a zkid `ConstraintSystem` to ark-relations.

use ark_ff::PrimeField;
use ark_relations::r1cs::{
    ConstraintSynthesizer, ConstraintSystemRef, LinearCombination as ArkLc, SynthesisError,
    Variable as ArkVariable,
};
use constraints::{ConstraintSystem, LinearCombination, Visibility};

/// Lets ark-groth16 synthesize a compiled constraint system.
///
/// Wires are handed to ark in index order. Public wires become instance
/// variables, so ark's instance vector matches the order of a
/// `PublicWitness`; everything else becomes a witness variable.
pub(crate) struct R1csAdapter<'a, F: PrimeField> {
    cs: &'a ConstraintSystem<F>,
    witness: Option<&'a [F]>,
}

impl<'a, F: PrimeField> R1csAdapter<'a, F> {
    /// Shape only; values are never requested during setup.
    pub(crate) fn for_setup(cs: &'a ConstraintSystem<F>) -> Self {
        Self { cs, witness: None }
    }

    pub(crate) fn for_proving(cs: &'a ConstraintSystem<F>, witness: &'a [F]) -> Self {
        Self {
            cs,
            witness: Some(witness),
        }
    }
}

impl<F: PrimeField> ConstraintSynthesizer<F> for R1csAdapter<'_, F> {
    fn generate_constraints(self, ark_cs: ConstraintSystemRef<F>) -> Result<(), SynthesisError> {
        let witness = self.witness;
        let value = |i: usize| move || witness.map(|w| w[i]).ok_or(SynthesisError::AssignmentMissing);

        // Index 0 → ark's built-in ONE
        let mut var_map: Vec<ArkVariable> = Vec::with_capacity(self.cs.num_variables());
        var_map.push(ArkVariable::One);

        for (i, visibility) in self.cs.layout().iter().enumerate().skip(1) {
            let v = match visibility {
                Visibility::Public => ark_cs.new_input_variable(value(i))?,
                _ => ark_cs.new_witness_variable(value(i))?,
            };
            var_map.push(v);
        }

        for constraint in self.cs.constraints() {
            ark_cs.enforce_constraint(
                convert_lc(&constraint.a, &var_map),
                convert_lc(&constraint.b, &var_map),
                convert_lc(&constraint.c, &var_map),
            )?;
        }
        Ok(())
    }
}

fn convert_lc<F: PrimeField>(lc: &LinearCombination<F>, var_map: &[ArkVariable]) -> ArkLc<F> {
    let mut ark_lc = ArkLc::zero();
    for (var, coeff) in &lc.terms {
        ark_lc += (*coeff, var_map[var.index()]);
    }
    ark_lc
}
