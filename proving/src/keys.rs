//! Groth16 keys, proofs and setup randomness.

use std::fmt;

use ark_ec::AffineRepr;
use constraints::CircuitDigest;
use rand::rngs::{OsRng, StdRng};
use rand::{CryptoRng, RngCore, SeedableRng};
use zeroize::Zeroize;

use crate::curve::SupportedCurve;

/// Groth16 proving key bound to the constraint system it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct ProvingKey<E: SupportedCurve> {
    pub(crate) inner: ark_groth16::ProvingKey<E>,
    pub(crate) digest: CircuitDigest,
}

impl<E: SupportedCurve> ProvingKey<E> {
    pub fn circuit_digest(&self) -> CircuitDigest {
        self.digest
    }

    pub fn inner(&self) -> &ark_groth16::ProvingKey<E> {
        &self.inner
    }

    /// The verifying key embedded in this proving key.
    pub fn verifying_key(&self) -> VerifyingKey<E> {
        VerifyingKey {
            inner: self.inner.vk.clone(),
            digest: self.digest,
        }
    }
}

/// Groth16 verifying key bound to the constraint system it was derived from.
#[derive(Clone, Debug, PartialEq)]
pub struct VerifyingKey<E: SupportedCurve> {
    pub(crate) inner: ark_groth16::VerifyingKey<E>,
    pub(crate) digest: CircuitDigest,
}

impl<E: SupportedCurve> VerifyingKey<E> {
    pub fn circuit_digest(&self) -> CircuitDigest {
        self.digest
    }

    pub fn inner(&self) -> &ark_groth16::VerifyingKey<E> {
        &self.inner
    }

    /// Number of public inputs the key accepts.
    pub fn num_public_inputs(&self) -> usize {
        self.inner.gamma_abc_g1.len().saturating_sub(1)
    }

    /// Name of the first fixed point that is the group identity.
    pub(crate) fn identity_point(&self) -> Option<&'static str> {
        let vk = &self.inner;
        [
            ("vk.alpha_g1", vk.alpha_g1.is_zero()),
            ("vk.beta_g2", vk.beta_g2.is_zero()),
            ("vk.gamma_g2", vk.gamma_g2.is_zero()),
            ("vk.delta_g2", vk.delta_g2.is_zero()),
        ]
        .into_iter()
        .find_map(|(name, zero)| zero.then_some(name))
    }
}

/// A Groth16 proof: A, C in G1 and B in G2.
#[derive(Clone, Debug, PartialEq)]
pub struct Proof<E: SupportedCurve> {
    pub(crate) inner: ark_groth16::Proof<E>,
}

impl<E: SupportedCurve> Proof<E> {
    pub fn inner(&self) -> &ark_groth16::Proof<E> {
        &self.inner
    }

    pub(crate) fn identity_point(&self) -> Option<&'static str> {
        let p = &self.inner;
        [("A", p.a.is_zero()), ("B", p.b.is_zero()), ("C", p.c.is_zero())]
            .into_iter()
            .find_map(|(name, zero)| zero.then_some(name))
    }
}

impl<E: SupportedCurve> From<ark_groth16::Proof<E>> for Proof<E> {
    fn from(inner: ark_groth16::Proof<E>) -> Self {
        Self { inner }
    }
}

// ============================================================================
// Setup randomness
// ============================================================================

/// Seed for one trusted setup.
///
/// Consumed by [`setup`](crate::setup::setup) and zeroized on drop, so a seed
/// cannot be reused for a second constraint system by accident.
pub struct SetupRandomness {
    seed: [u8; 32],
}

impl SetupRandomness {
    /// Fresh seed from the operating system.
    pub fn from_os_rng() -> Self {
        let mut seed = [0u8; 32];
        OsRng.fill_bytes(&mut seed);
        Self { seed }
    }

    /// Fixed seed, for reproducible keys.
    pub fn from_seed(seed: [u8; 32]) -> Self {
        Self { seed }
    }

    pub(crate) fn into_rng(mut self) -> SetupRng {
        let rng = StdRng::from_seed(self.seed);
        self.seed.zeroize();
        SetupRng(rng)
    }
}

impl Drop for SetupRandomness {
    fn drop(&mut self) {
        self.seed.zeroize();
    }
}

/// RNG expanded from a [`SetupRandomness`] seed.
///
/// `StdRng` has no zeroize support, so its state is overwritten with the
/// all-zero seed's state on drop.
pub(crate) struct SetupRng(StdRng);

impl SetupRng {
    fn wipe(&mut self) {
        self.0 = StdRng::from_seed([0u8; 32]);
        std::hint::black_box(&mut self.0);
    }
}

impl Drop for SetupRng {
    fn drop(&mut self) {
        self.wipe();
    }
}

impl RngCore for SetupRng {
    fn next_u32(&mut self) -> u32 {
        self.0.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.0.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.0.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.0.try_fill_bytes(dest)
    }
}

impl CryptoRng for SetupRng {}

impl fmt::Debug for SetupRandomness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SetupRandomness(..)")
    }
}
