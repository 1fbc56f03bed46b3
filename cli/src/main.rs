use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use cli::args::{Cli, Commands};
use cli::commands::prove::{ProvePaths, ProveSources};
use cli::commands::verify::{VerifyExpectations, VerifyPaths};
use cli::commands::{inspect, prove, resolve_config, setup, verify};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = resolve_config(cli.config.as_deref(), cli.curve)?;

    match cli.command {
        Commands::Setup { circuit, pk, vk, seed } => {
            setup::setup_command(&config, &circuit, pk.as_deref(), vk.as_deref(), seed.as_deref())
        }
        Commands::Prove {
            circuit,
            input,
            token,
            jwks,
            salt,
            pk,
            proof,
            public,
        } => prove::prove_command(
            &config,
            &circuit,
            &ProveSources {
                input,
                token,
                jwks,
                salt,
            },
            &ProvePaths { pk, proof, public },
        ),
        Commands::Verify {
            circuit,
            input,
            issuer_jwks,
            disclosed,
            vk,
            proof,
            public,
        } => verify::verify_command(
            &config,
            &circuit,
            &VerifyExpectations {
                input,
                issuer_jwks,
                disclosed,
            },
            &VerifyPaths { vk, proof, public },
        ),
        Commands::Inspect { path } => inspect::inspect_command(&path),
    }
}
