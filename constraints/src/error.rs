use thiserror::Error;

/// Errors detected while a circuit is being compiled into a constraint system.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CircuitDefinitionError {
    /// Two declarations used the same name.
    #[error("variable `{0}` is declared more than once")]
    DuplicateVariable(String),
    /// A declaration used an empty name.
    #[error("variable names must not be empty")]
    EmptyName,
    /// A constraint between constants can never hold.
    #[error("contradictory constraint between constants ({context})")]
    ContradictoryConstants { context: &'static str },
    /// `assert_boolean` on a constant other than 0 or 1.
    #[error("constant asserted boolean is neither 0 nor 1")]
    NonBooleanConstant,
    /// Inverse or division of the constant zero.
    #[error("division by the constant zero")]
    DivisionByZero,
    /// `to_bits` asked for more bits than can be decomposed soundly.
    #[error("cannot decompose into {requested} bits (field allows at most {max})")]
    BitWidth { requested: usize, max: usize },
    /// Circuit parameters that describe no valid shape.
    #[error("invalid circuit shape: {0}")]
    InvalidShape(String),
}

/// Errors raised while mapping concrete values onto declared variables.
#[derive(Debug, Error)]
pub enum AssignmentError {
    /// A declared input has no value.
    #[error("no value assigned to declared variable `{0}`")]
    Missing(String),
    /// A value was supplied for a name the circuit does not declare.
    #[error("assignment names unknown variable `{0}`")]
    Unknown(String),
    /// The external source of input values (e.g. a token validator) failed.
    #[error("input values could not be produced: {0}")]
    ClaimSource(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// A fully assigned witness does not satisfy the constraint system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("constraint {index} is not satisfied")]
pub struct ConstraintViolationError {
    /// Position of the first failing constraint.
    pub index: usize,
}

/// Failure of `build_witness`.
#[derive(Debug, Error)]
pub enum WitnessError {
    #[error(transparent)]
    Assignment(#[from] AssignmentError),
    #[error(transparent)]
    ConstraintViolation(#[from] ConstraintViolationError),
    /// The vector checked has a different number of wires than the system.
    #[error("witness has {actual} wires, the constraint system has {expected}")]
    WrongLength { expected: usize, actual: usize },
    /// Wire 0 does not hold the constant one.
    #[error("witness wire 0 is not one")]
    MissingOne,
}
