//! Groth16 verification.

use ark_groth16::{Groth16, PreparedVerifyingKey};
use ark_serialize::Valid;
use constraints::{CircuitDigest, PublicWitness};
use tracing::{debug, info_span};

use crate::curve::SupportedCurve;
use crate::error::VerificationError;
use crate::keys::{Proof, VerifyingKey};

/// Check `proof` against `vk` and the public inputs.
///
/// `Ok(false)` means the proof is well formed but does not verify.
pub fn verify<E: SupportedCurve>(
    proof: &Proof<E>,
    vk: &VerifyingKey<E>,
    public: &PublicWitness<E::ScalarField>,
) -> Result<bool, VerificationError> {
    PreparedVerifier::new(vk).verify(proof, public)
}

/// A verifying key with its pairing precomputation done once.
#[derive(Clone, Debug)]
pub struct PreparedVerifier<E: SupportedCurve> {
    pvk: PreparedVerifyingKey<E>,
    digest: CircuitDigest,
    num_public: usize,
}

impl<E: SupportedCurve> PreparedVerifier<E> {
    pub fn new(vk: &VerifyingKey<E>) -> Self {
        Self {
            pvk: ark_groth16::prepare_verifying_key(&vk.inner),
            digest: vk.digest,
            num_public: vk.num_public_inputs(),
        }
    }

    pub fn verify(
        &self,
        proof: &Proof<E>,
        public: &PublicWitness<E::ScalarField>,
    ) -> Result<bool, VerificationError> {
        let _span = info_span!("verify", curve = %E::ID, public_inputs = public.len()).entered();

        if public.circuit_digest() != self.digest {
            return Err(VerificationError::CircuitMismatch);
        }
        if public.len() != self.num_public {
            return Err(VerificationError::PublicInputCount {
                expected: self.num_public,
                actual: public.len(),
            });
        }
        if let Some(point) = proof.identity_point() {
            return Err(VerificationError::InvalidPoint(point));
        }
        let p = &proof.inner;
        p.a.check().map_err(|_| VerificationError::InvalidPoint("A"))?;
        p.b.check().map_err(|_| VerificationError::InvalidPoint("B"))?;
        p.c.check().map_err(|_| VerificationError::InvalidPoint("C"))?;

        let accepted = Groth16::<E>::verify_proof(&self.pvk, p, public.values())?;
        debug!(accepted, "pairing check done");
        Ok(accepted)
    }
}
