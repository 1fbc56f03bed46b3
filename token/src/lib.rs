//! Identity-token collaborator for zkid circuits.
//!
//! Resolves a provider's JWK, validates an RS256 token with `jwt-simple`
//! and encodes the resulting claims into a [`ClaimCircuit`] assignment.
//! Nothing here runs inside a circuit.
//!
//! [`ClaimCircuit`]: constraints::circuits::ClaimCircuit

pub mod encode;
pub mod error;
pub mod jwk;
pub mod validate;

pub use encode::{claim_assignment, encode_claim, key_fingerprint};
pub use error::TokenValidationError;
pub use jwk::{Jwk, KeySet};
pub use validate::{parse_and_validate, token_key_id, validate_with_keys, ClaimSet};
