use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use proving::CurveId;

#[derive(Parser)]
#[command(name = "zkid")]
#[command(about = "Groth16 proofs over identity-token claims", long_about = None)]
pub struct Cli {
    /// Pipeline config (TOML); flags override its values
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// Curve: bn254 or bls12-381
    #[arg(long, global = true)]
    pub curve: Option<CurveId>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a proving and verifying key for a circuit
    Setup {
        #[command(flatten)]
        circuit: CircuitArgs,
        /// Output proving key
        #[arg(long)]
        pk: Option<PathBuf>,
        /// Output verifying key
        #[arg(long)]
        vk: Option<PathBuf>,
        /// Deterministic setup: the seed is the SHA-256 of this text
        #[arg(long)]
        seed: Option<String>,
    },
    /// Prove a circuit's statement and write the proof and public witness
    Prove {
        #[command(flatten)]
        circuit: CircuitArgs,
        /// Cubic inputs as name=value pairs (comma-separated, decimal or 0x hex)
        #[arg(long)]
        input: Option<String>,
        /// File holding a compact RS256 token
        #[arg(long)]
        token: Option<PathBuf>,
        /// JWK set (or single JWK) of the token issuer
        #[arg(long)]
        jwks: Option<PathBuf>,
        /// Commitment salt (decimal or 0x hex)
        #[arg(long)]
        salt: Option<String>,
        #[arg(long)]
        pk: Option<PathBuf>,
        /// Output proof
        #[arg(long)]
        proof: Option<PathBuf>,
        /// Output public witness
        #[arg(long)]
        public: Option<PathBuf>,
    },
    /// Check a proof against a verifying key and public witness
    Verify {
        #[command(flatten)]
        circuit: CircuitArgs,
        /// Expected public inputs as name=value pairs
        #[arg(long)]
        input: Option<String>,
        /// JWK set the proven issuer key must belong to
        #[arg(long)]
        issuer_jwks: Option<PathBuf>,
        /// Expected disclosed claims as claim=value (repeatable, JSON or plain text)
        #[arg(long)]
        disclosed: Vec<String>,
        #[arg(long)]
        vk: Option<PathBuf>,
        #[arg(long)]
        proof: Option<PathBuf>,
        #[arg(long)]
        public: Option<PathBuf>,
    },
    /// Print the header of an artifact file
    Inspect {
        path: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum CircuitKind {
    /// x^3 + x + 5 = y
    Cubic,
    /// Commitment to token claims with selective disclosure
    Claims,
}

#[derive(Debug, Clone, Args)]
pub struct CircuitArgs {
    #[arg(long, value_enum, default_value = "cubic")]
    pub circuit: CircuitKind,
    /// Claim names committed to (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub claims: Vec<String>,
    /// Claims revealed as public inputs (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub disclose: Vec<String>,
}
