use std::path::Path;

use anyhow::Result;
use proving::artifacts::save_with;
use proving::{setup_with_options, PipelineConfig, SetupRandomness, SupportedCurve};
use sha2::{Digest, Sha256};
use tracing::warn;

use super::{on_curve, CircuitChoice};
use crate::args::CircuitArgs;

pub fn setup_command(
    config: &PipelineConfig,
    circuit: &CircuitArgs,
    pk_path: Option<&Path>,
    vk_path: Option<&Path>,
    seed: Option<&str>,
) -> Result<()> {
    let choice = CircuitChoice::from_args(circuit)?;
    let pk_path = pk_path.unwrap_or(&config.artifacts.proving_key);
    let vk_path = vk_path.unwrap_or(&config.artifacts.verifying_key);
    on_curve!(config.pipeline.curve, run(config, &choice, pk_path, vk_path, seed))
}

fn run<E: SupportedCurve>(
    config: &PipelineConfig,
    choice: &CircuitChoice,
    pk_path: &Path,
    vk_path: &Path,
    seed: Option<&str>,
) -> Result<()> {
    let cs = choice.compile::<E::ScalarField>()?;

    let randomness = match seed {
        Some(seed) => {
            warn!("setup seeded from the command line; keys are reproducible by anyone with the seed");
            SetupRandomness::from_seed(Sha256::digest(seed.as_bytes()).into())
        }
        None => SetupRandomness::from_os_rng(),
    };
    let (pk, vk) =
        setup_with_options::<E>(&cs, randomness, &config.setup_options()).map_err(proving::Error::from)?;

    let encoding = config.pipeline.point_encoding;
    save_with(pk_path, &pk, encoding).map_err(proving::Error::from)?;
    eprintln!("wrote {} (proving key, {})", pk_path.display(), E::ID);
    save_with(vk_path, &vk, encoding).map_err(proving::Error::from)?;
    eprintln!(
        "wrote {} (verifying key, {} public inputs)",
        vk_path.display(),
        vk.num_public_inputs()
    );
    Ok(())
}
