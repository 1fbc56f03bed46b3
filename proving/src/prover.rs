//! Groth16 proof generation.

use ark_groth16::Groth16;
use ark_snark::SNARK;
use constraints::{ConstraintSystem, Witness};
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use tracing::{debug, info_span};

use crate::adapter::R1csAdapter;
use crate::curve::SupportedCurve;
use crate::error::ProvingError;
use crate::keys::{Proof, ProvingKey};

/// Prove that `witness` satisfies `cs`.
///
/// Blinding factors are drawn from `rng` on every call, so two proofs of the
/// same witness are unlinkable.
pub fn prove<E, R>(
    cs: &ConstraintSystem<E::ScalarField>,
    pk: &ProvingKey<E>,
    witness: &Witness<E::ScalarField>,
    rng: &mut R,
) -> Result<Proof<E>, ProvingError>
where
    E: SupportedCurve,
    R: RngCore + CryptoRng,
{
    let _span = info_span!("prove", curve = %E::ID, constraints = cs.num_constraints()).entered();

    if witness.len() != cs.num_variables() {
        return Err(ProvingError::WitnessLength {
            expected: cs.num_variables(),
            actual: witness.len(),
        });
    }
    let digest = cs.digest();
    if witness.circuit_digest() != digest {
        return Err(ProvingError::WitnessMismatch);
    }
    if pk.digest != digest {
        return Err(ProvingError::KeyMismatch);
    }

    let proof = Groth16::<E>::prove(&pk.inner, R1csAdapter::for_proving(cs, witness.values()), rng)?;
    debug!(digest = %digest.short(), "proof generated");
    Ok(Proof { inner: proof })
}

/// [`prove`] with blinding drawn from the operating system.
pub fn prove_with_os_rng<E: SupportedCurve>(
    cs: &ConstraintSystem<E::ScalarField>,
    pk: &ProvingKey<E>,
    witness: &Witness<E::ScalarField>,
) -> Result<Proof<E>, ProvingError> {
    prove(cs, pk, witness, &mut OsRng)
}
