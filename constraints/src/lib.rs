//! Constraint systems for the zkid proof pipeline.
//!
//! Circuits implement [`Circuit`] and are compiled into an R1CS
//! [`ConstraintSystem`] with [`compile`]; [`build_witness`] solves and checks
//! a full assignment against it. Everything is generic over the scalar field.

pub mod builder;
pub mod circuits;
pub mod error;
pub mod hint;
pub mod poseidon;
pub mod r1cs;
pub mod witness;

pub use builder::{compile, Circuit, CircuitApi, Declarations};
pub use error::{AssignmentError, CircuitDefinitionError, ConstraintViolationError, WitnessError};
pub use r1cs::{CircuitDigest, Constraint, ConstraintSystem, LinearCombination, Variable, Visibility};
pub use witness::{build_witness, Assignment, PublicWitness, Witness};
