use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use constraints::circuits::ClaimCircuit;
use constraints::{ConstraintSystem, PublicWitness};
use proving::artifacts::load;
use proving::{verify, CurveScalar, PipelineConfig, Proof, SupportedCurve, VerifyingKey};
use serde_json::Value;
use token::{encode_claim, key_fingerprint, KeySet};

use super::{on_curve, CircuitChoice};
use crate::args::CircuitArgs;
use crate::inputs::parse_inputs;

#[derive(Debug, Clone, Default)]
pub struct VerifyPaths {
    pub vk: Option<PathBuf>,
    pub proof: Option<PathBuf>,
    pub public: Option<PathBuf>,
}

/// Values the verifier requires of the public witness.
#[derive(Debug, Clone, Default)]
pub struct VerifyExpectations {
    /// Public inputs as `name=value` pairs.
    pub input: Option<String>,
    /// Trusted issuer keys; the proven issuer key must be one of them.
    pub issuer_jwks: Option<PathBuf>,
    /// `claim=value` for disclosed claims. Values are JSON, falling back to
    /// a plain string.
    pub disclosed: Vec<String>,
}

/// Fails unless the proof verifies for the selected circuit and every
/// expected public value matches. Prints the public inputs on success.
pub fn verify_command(
    config: &PipelineConfig,
    circuit: &CircuitArgs,
    expected: &VerifyExpectations,
    paths: &VerifyPaths,
) -> Result<()> {
    let choice = CircuitChoice::from_args(circuit)?;
    let claims_only = expected.issuer_jwks.is_some() || !expected.disclosed.is_empty();
    if matches!(choice, CircuitChoice::Cubic) && claims_only {
        bail!("--issuer-jwks and --disclosed only apply to --circuit claims");
    }
    let artifacts = &config.artifacts;
    let vk_path = paths.vk.as_deref().unwrap_or(&artifacts.verifying_key);
    let proof_path = paths.proof.as_deref().unwrap_or(&artifacts.proof);
    let public_path = paths.public.as_deref().unwrap_or(&artifacts.public_witness);
    on_curve!(
        config.pipeline.curve,
        run(&choice, expected, vk_path, proof_path, public_path)
    )
}

fn run<E>(
    choice: &CircuitChoice,
    expected: &VerifyExpectations,
    vk_path: &Path,
    proof_path: &Path,
    public_path: &Path,
) -> Result<()>
where
    E: SupportedCurve,
    E::ScalarField: CurveScalar,
{
    let vk: VerifyingKey<E> = load(vk_path).map_err(proving::Error::from)?;
    let proof: Proof<E> = load(proof_path).map_err(proving::Error::from)?;
    let public: PublicWitness<E::ScalarField> = load(public_path).map_err(proving::Error::from)?;

    let cs = choice.compile::<E::ScalarField>()?;
    if cs.digest() != public.circuit_digest() {
        bail!(
            "verify: public witness is for circuit {}, not the {} circuit ({})",
            public.circuit_digest().short(),
            choice.name(),
            cs.digest().short(),
        );
    }

    if !verify(&proof, &vk, &public).map_err(proving::Error::from)? {
        bail!("verify: proof rejected");
    }

    let names = public_names(&cs);
    check_expectations(choice, expected, &names, public.values())?;

    println!("proof verified ({}, {} public inputs)", E::ID, public.len());
    for (name, value) in names.iter().zip(public.values()) {
        println!("  {name} = {value}");
    }
    Ok(())
}

/// Declared names of the public wires, in public witness order.
fn public_names<F: CurveScalar>(cs: &ConstraintSystem<F>) -> Vec<String> {
    cs.public_indices()
        .into_iter()
        .map(|index| {
            cs.inputs()
                .iter()
                .find(|input| input.variable.index() == index)
                .map_or_else(|| format!("wire[{index}]"), |input| input.name.clone())
        })
        .collect()
}

fn check_expectations<F: CurveScalar>(
    choice: &CircuitChoice,
    expected: &VerifyExpectations,
    names: &[String],
    values: &[F],
) -> Result<()> {
    let actual = |name: &str| -> Result<F> {
        names
            .iter()
            .position(|n| n == name)
            .map(|i| values[i])
            .with_context(|| format!("verify: `{name}` is not a public input of the {} circuit", choice.name()))
    };

    if let Some(raw) = expected.input.as_deref() {
        let wanted = parse_inputs::<F>(raw)?;
        for (name, &want) in wanted.iter() {
            let got = actual(name)?;
            if got != want {
                bail!("verify: public input `{name}` is {got}, expected {want}");
            }
        }
    }

    let CircuitChoice::Claims(circuit) = choice else {
        return Ok(());
    };

    if let Some(path) = expected.issuer_jwks.as_deref() {
        let json = fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?;
        let keys = KeySet::from_json(&json).context("--issuer-jwks")?;
        let issuer = actual("issuer_key")?;
        let trusted = keys
            .keys
            .iter()
            .map(key_fingerprint::<F>)
            .collect::<Result<Vec<F>, _>>()
            .context("--issuer-jwks")?;
        if !trusted.contains(&issuer) {
            bail!("verify: proven issuer key is not in {}", path.display());
        }
    }

    for pair in &expected.disclosed {
        let (claim, raw) = pair
            .split_once('=')
            .with_context(|| format!("invalid --disclosed {pair:?} (expected claim=value)"))?;
        let slot = disclosed_slot(circuit, claim.trim())?;
        let want = expected_claim::<F>(raw.trim());
        let got = actual(&slot)?;
        if got != want {
            bail!("verify: disclosed claim `{}` does not match {raw:?}", claim.trim());
        }
    }
    Ok(())
}

fn disclosed_slot(circuit: &ClaimCircuit, claim: &str) -> Result<String> {
    match circuit.disclosed().position(|name| name == claim) {
        Some(j) => Ok(format!("disclosed[{j}]")),
        None => bail!("verify: claim `{claim}` is not disclosed by this circuit"),
    }
}

/// JSON values encode as the prover encoded them; other text is a string.
fn expected_claim<F: CurveScalar>(raw: &str) -> F {
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    encode_claim::<F>(&value)
}
