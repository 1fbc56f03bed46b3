//! Subcommand implementations.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ark_ff::PrimeField;
use constraints::circuits::{ClaimCircuit, CubicCircuit};
use constraints::{compile, ConstraintSystem};
use proving::{CurveId, PipelineConfig};

use crate::args::{CircuitArgs, CircuitKind};

/// Runs a curve-generic function on the configured curve.
macro_rules! on_curve {
    ($curve:expr, $f:ident($($arg:expr),* $(,)?)) => {
        match $curve {
            proving::CurveId::Bn254 => $f::<proving::curve::Bn254>($($arg),*),
            proving::CurveId::Bls12_381 => $f::<proving::curve::Bls12_381>($($arg),*),
        }
    };
}
pub(crate) use on_curve;

pub mod inspect;
pub mod prove;
pub mod setup;
pub mod verify;

/// Loads `--config` (or the defaults) and applies `--curve`.
pub fn resolve_config(path: Option<&Path>, curve: Option<CurveId>) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path).context("config")?,
        None => PipelineConfig::default(),
    };
    if let Some(curve) = curve {
        config.pipeline.curve = curve;
    }
    Ok(config)
}

/// The circuit selected by `--circuit` and its shape flags.
#[derive(Debug, Clone)]
pub enum CircuitChoice {
    Cubic,
    Claims(ClaimCircuit),
}

impl CircuitChoice {
    pub fn from_args(args: &CircuitArgs) -> Result<Self> {
        match args.circuit {
            CircuitKind::Cubic => {
                if !args.claims.is_empty() || !args.disclose.is_empty() {
                    anyhow::bail!("--claims and --disclose only apply to --circuit claims");
                }
                Ok(CircuitChoice::Cubic)
            }
            CircuitKind::Claims => {
                let circuit = ClaimCircuit::new(args.claims.iter().cloned(), &args.disclose)
                    .map_err(proving::Error::from)?;
                Ok(CircuitChoice::Claims(circuit))
            }
        }
    }

    pub fn compile<F: PrimeField>(&self) -> Result<Arc<ConstraintSystem<F>>> {
        let cs = match self {
            CircuitChoice::Cubic => compile::<F, _>(&CubicCircuit),
            CircuitChoice::Claims(circuit) => compile::<F, _>(circuit),
        };
        let cs = cs.map_err(proving::Error::from)?;
        eprintln!(
            "compiled {} ({} constraints, {} public inputs, digest {})",
            self.name(),
            cs.num_constraints(),
            cs.num_pub_inputs(),
            cs.digest().short(),
        );
        Ok(cs)
    }

    pub fn name(&self) -> &'static str {
        match self {
            CircuitChoice::Cubic => "cubic",
            CircuitChoice::Claims(_) => "claims",
        }
    }
}
