//! Circuit-specific trusted setup.

use ark_groth16::Groth16;
use ark_snark::SNARK;
use constraints::ConstraintSystem;
use tracing::{debug, info_span};

use crate::adapter::R1csAdapter;
use crate::curve::SupportedCurve;
use crate::error::SetupError;
use crate::keys::{ProvingKey, SetupRandomness, VerifyingKey};

/// Limits applied before running setup.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetupOptions {
    /// Reject constraint systems larger than this.
    pub max_constraints: Option<usize>,
}

/// Run the Groth16 setup for `cs`.
///
/// The same constraint system and seed always produce the same keys.
pub fn setup<E: SupportedCurve>(
    cs: &ConstraintSystem<E::ScalarField>,
    randomness: SetupRandomness,
) -> Result<(ProvingKey<E>, VerifyingKey<E>), SetupError> {
    setup_with_options(cs, randomness, &SetupOptions::default())
}

pub fn setup_with_options<E: SupportedCurve>(
    cs: &ConstraintSystem<E::ScalarField>,
    randomness: SetupRandomness,
    options: &SetupOptions,
) -> Result<(ProvingKey<E>, VerifyingKey<E>), SetupError> {
    let _span = info_span!("setup", curve = %E::ID, constraints = cs.num_constraints()).entered();

    if let Some(max) = options.max_constraints {
        if cs.num_constraints() > max {
            return Err(SetupError::TooManyConstraints {
                count: cs.num_constraints(),
                max,
            });
        }
    }
    if let Some(index) = cs.first_unsatisfiable() {
        return Err(SetupError::UnsatisfiableConstraint { index });
    }

    let (pk, vk) = {
        let mut rng = randomness.into_rng();
        Groth16::<E>::circuit_specific_setup(R1csAdapter::for_setup(cs), &mut rng)?
    };

    let digest = cs.digest();
    debug!(
        digest = %digest.short(),
        public_inputs = vk.gamma_abc_g1.len() - 1,
        "keys generated"
    );
    Ok((
        ProvingKey { inner: pk, digest },
        VerifyingKey { inner: vk, digest },
    ))
}
