//! Groth16 over arkworks for zkid constraint systems.
//!
//! [`setup`] derives keys for a compiled constraint system, [`prove`] turns a
//! checked witness into a proof, and [`verify`] checks it against the public
//! witness. Keys, proofs and public witnesses share one headered binary
//! format ([`serialize`]) and can be stored with [`artifacts`].

mod adapter;
pub mod artifacts;
pub mod config;
pub mod curve;
pub mod error;
pub mod keys;
pub mod prover;
pub mod serialize;
pub mod setup;
pub mod verifier;

pub use config::PipelineConfig;
pub use curve::{CurveId, CurveScalar, SupportedCurve};
pub use error::{
    DeserializationError, Error, ProvingError, SerializationError, SetupError, Stage, VerificationError,
};
pub use keys::{Proof, ProvingKey, SetupRandomness, VerifyingKey};
pub use prover::{prove, prove_with_os_rng};
pub use serialize::{Artifact, ArtifactKind, Header, PointEncoding};
pub use setup::{setup, setup_with_options, SetupOptions};
pub use verifier::{verify, PreparedVerifier};
