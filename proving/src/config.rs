//! Pipeline configuration (`zkid.toml`).
//!
//! ```toml
//! [pipeline]
//! curve = "bn254"
//! max_constraints = 1000000
//! point_encoding = "compressed"
//!
//! [artifacts]
//! proving_key = "proving.key"
//! verifying_key = "verifying.key"
//! proof = "proof.data"
//! public_witness = "public.wtns"
//! ```
//!
//! Every key is optional.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::curve::CurveId;
use crate::serialize::PointEncoding;
use crate::setup::SetupOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    pub pipeline: PipelineSection,
    pub artifacts: ArtifactPaths,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineSection {
    pub curve: CurveId,
    pub max_constraints: Option<usize>,
    pub point_encoding: PointEncoding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ArtifactPaths {
    pub proving_key: PathBuf,
    pub verifying_key: PathBuf,
    pub proof: PathBuf,
    pub public_witness: PathBuf,
}

impl Default for ArtifactPaths {
    fn default() -> Self {
        Self {
            proving_key: PathBuf::from("proving.key"),
            verifying_key: PathBuf::from("verifying.key"),
            proof: PathBuf::from("proof.data"),
            public_witness: PathBuf::from("public.wtns"),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    pub fn setup_options(&self) -> SetupOptions {
        SetupOptions {
            max_constraints: self.pipeline.max_constraints,
        }
    }
}
