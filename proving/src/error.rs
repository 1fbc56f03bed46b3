//! Error taxonomy of the proof pipeline.
//!
//! Every stage has its own error type; [`Error`] wraps any of them together
//! with the [`Stage`] that failed.

use std::fmt;
use std::io;
use std::path::PathBuf;

use ark_relations::r1cs::SynthesisError;
use constraints::{AssignmentError, CircuitDefinitionError, WitnessError};
use thiserror::Error;

use crate::curve::CurveId;
use crate::serialize::ArtifactKind;

#[derive(Debug, Error)]
pub enum SetupError {
    #[error("circuit has {count} constraints, above the configured maximum of {max}")]
    TooManyConstraints { count: usize, max: usize },
    #[error("constraint {index} relates constants only and can never be satisfied")]
    UnsatisfiableConstraint { index: usize },
    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

#[derive(Debug, Error)]
pub enum ProvingError {
    #[error("witness has {actual} wires, constraint system has {expected}")]
    WitnessLength { expected: usize, actual: usize },
    #[error("witness was built for a different constraint system")]
    WitnessMismatch,
    #[error("proving key was generated for a different constraint system")]
    KeyMismatch,
    #[error("constraint synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

#[derive(Debug, Error)]
pub enum VerificationError {
    #[error("public witness and verifying key belong to different circuits")]
    CircuitMismatch,
    #[error("verifying key expects {expected} public inputs, got {actual}")]
    PublicInputCount { expected: usize, actual: usize },
    #[error("proof point {0} is the identity or outside the prime-order subgroup")]
    InvalidPoint(&'static str),
    #[error("pairing check failed to run: {0}")]
    Pairing(#[from] SynthesisError),
}

#[derive(Debug, Error)]
pub enum SerializationError {
    #[error("i/o error writing {}: {source}", describe(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
    #[error("encoding failed: {0}")]
    Encode(#[from] ark_serialize::SerializationError),
}

impl From<io::Error> for SerializationError {
    fn from(source: io::Error) -> Self {
        SerializationError::Io { path: None, source }
    }
}

#[derive(Debug, Error)]
pub enum DeserializationError {
    #[error("i/o error reading {}: {source}", describe(.path))]
    Io {
        path: Option<PathBuf>,
        #[source]
        source: io::Error,
    },
    #[error("bad magic bytes {0:02x?}")]
    BadMagic([u8; 4]),
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    #[error("unknown artifact kind {0}")]
    UnknownKind(u8),
    #[error("expected a {expected} artifact, found a {found}")]
    WrongKind { expected: ArtifactKind, found: ArtifactKind },
    #[error("unknown curve id {0}")]
    UnknownCurve(u8),
    #[error("artifact is for {found}, expected {expected}")]
    CurveMismatch { expected: CurveId, found: CurveId },
    #[error("unknown point encoding {0}")]
    UnknownEncoding(u8),
    #[error("reserved header bytes are not zero")]
    ReservedBytes,
    #[error("payload is {actual} bytes, expected {expected}")]
    PayloadLength { expected: u64, actual: u64 },
    #[error("artifact ends before its declared payload")]
    Truncated,
    #[error("{0} bytes follow the artifact")]
    TrailingBytes(usize),
    #[error("point {0} is the identity")]
    IdentityPoint(&'static str),
    #[error("decoding failed: {0}")]
    Decode(#[from] ark_serialize::SerializationError),
}

impl From<io::Error> for DeserializationError {
    fn from(source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::UnexpectedEof {
            DeserializationError::Truncated
        } else {
            DeserializationError::Io { path: None, source }
        }
    }
}

fn describe(path: &Option<PathBuf>) -> String {
    match path {
        Some(path) => path.display().to_string(),
        None => "stream".to_string(),
    }
}

// ============================================================================
// Umbrella error
// ============================================================================

/// Pipeline phase, used to tag errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Compile,
    Setup,
    Witness,
    Prove,
    Verify,
    Serialize,
    Deserialize,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Stage::Compile => "compile",
            Stage::Setup => "setup",
            Stage::Witness => "witness",
            Stage::Prove => "prove",
            Stage::Verify => "verify",
            Stage::Serialize => "serialize",
            Stage::Deserialize => "deserialize",
        })
    }
}

/// Any pipeline error, tagged with the stage that raised it.
#[derive(Debug, Error)]
#[error("{stage}: {source}")]
pub struct Error {
    pub stage: Stage,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync + 'static>,
}

impl Error {
    pub fn new(stage: Stage, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self {
            stage,
            source: Box::new(source),
        }
    }
}

macro_rules! stage_from {
    ($($ty:ty => $stage:ident),* $(,)?) => {
        $(
            impl From<$ty> for Error {
                fn from(err: $ty) -> Self {
                    Error::new(Stage::$stage, err)
                }
            }
        )*
    };
}

stage_from! {
    CircuitDefinitionError => Compile,
    AssignmentError => Witness,
    WitnessError => Witness,
    SetupError => Setup,
    ProvingError => Prove,
    VerificationError => Verify,
    SerializationError => Serialize,
    DeserializationError => Deserialize,
}
