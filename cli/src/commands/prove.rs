use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use constraints::circuits::ClaimCircuit;
use constraints::{build_witness, Assignment, AssignmentError};
use proving::artifacts::{load, save_with};
use proving::{prove_with_os_rng, CurveScalar, PipelineConfig, ProvingKey, SupportedCurve};
use token::{claim_assignment, parse_and_validate, token_key_id, KeySet, TokenValidationError};

use super::{on_curve, CircuitChoice};
use crate::args::CircuitArgs;
use crate::inputs::{parse_field, parse_inputs};

/// Where the prover's private values come from.
#[derive(Debug, Clone, Default)]
pub struct ProveSources {
    /// `name=value` pairs for the cubic circuit.
    pub input: Option<String>,
    pub token: Option<PathBuf>,
    pub jwks: Option<PathBuf>,
    pub salt: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ProvePaths {
    pub pk: Option<PathBuf>,
    pub proof: Option<PathBuf>,
    pub public: Option<PathBuf>,
}

pub fn prove_command(
    config: &PipelineConfig,
    circuit: &CircuitArgs,
    sources: &ProveSources,
    paths: &ProvePaths,
) -> Result<()> {
    let choice = CircuitChoice::from_args(circuit)?;
    on_curve!(config.pipeline.curve, run(config, &choice, sources, paths))
}

fn run<E>(
    config: &PipelineConfig,
    choice: &CircuitChoice,
    sources: &ProveSources,
    paths: &ProvePaths,
) -> Result<()>
where
    E: SupportedCurve,
    E::ScalarField: CurveScalar,
{
    let artifacts = &config.artifacts;
    let pk_path = paths.pk.as_deref().unwrap_or(&artifacts.proving_key);
    let proof_path = paths.proof.as_deref().unwrap_or(&artifacts.proof);
    let public_path = paths.public.as_deref().unwrap_or(&artifacts.public_witness);

    let cs = choice.compile::<E::ScalarField>()?;
    let assignment = match choice {
        CircuitChoice::Cubic => {
            let raw = sources
                .input
                .as_deref()
                .context("--input is required for --circuit cubic")?;
            parse_inputs::<E::ScalarField>(raw)?
        }
        CircuitChoice::Claims(circuit) => token_assignment(circuit, sources)?,
    };
    let witness = build_witness(&cs, &assignment).map_err(proving::Error::from)?;

    let pk: ProvingKey<E> = load(pk_path).map_err(proving::Error::from)?;
    let proof = prove_with_os_rng(&cs, &pk, &witness).map_err(proving::Error::from)?;

    let encoding = config.pipeline.point_encoding;
    save_with(proof_path, &proof, encoding).map_err(proving::Error::from)?;
    eprintln!("wrote {} (proof, {})", proof_path.display(), E::ID);
    let public = witness.public();
    save_with(public_path, &public, encoding).map_err(proving::Error::from)?;
    eprintln!(
        "wrote {} (public witness, {} values)",
        public_path.display(),
        public.len()
    );
    Ok(())
}

fn token_assignment<F: CurveScalar>(circuit: &ClaimCircuit, sources: &ProveSources) -> Result<Assignment<F>> {
    let token_path = sources
        .token
        .as_deref()
        .context("--token is required for --circuit claims")?;
    let jwks_path = sources
        .jwks
        .as_deref()
        .context("--jwks is required for --circuit claims")?;
    let salt = sources
        .salt
        .as_deref()
        .context("--salt is required for --circuit claims")?;
    let salt = parse_field::<F>(salt).context("invalid --salt")?;

    let token = read_text(token_path)?;
    let token = token.trim();
    let keys = KeySet::from_json(&read_text(jwks_path)?).map_err(witness_error)?;
    let kid = token_key_id(token).map_err(witness_error)?;
    let key = keys.resolve_key(kid.as_deref()).map_err(witness_error)?;
    let claims = parse_and_validate(token, key).map_err(witness_error)?;
    eprintln!(
        "token validated (kid {}, {} claims)",
        kid.as_deref().unwrap_or("<none>"),
        claims.len()
    );

    Ok(claim_assignment(circuit, &claims, key, salt).map_err(proving::Error::from)?)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))
}

fn witness_error(err: TokenValidationError) -> proving::Error {
    proving::Error::from(AssignmentError::from(err))
}
