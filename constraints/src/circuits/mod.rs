//! Circuits shipped with the pipeline.

pub mod claims;
pub mod cubic;

pub use claims::ClaimCircuit;
pub use cubic::CubicCircuit;
