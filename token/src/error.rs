use constraints::AssignmentError;
use thiserror::Error;

/// Why a token or key could not be used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenValidationError {
    #[error("invalid key set: {0}")]
    InvalidKeySet(String),
    #[error("unusable key: {0}")]
    InvalidKey(String),
    #[error("no key matches kid {}", .0.as_deref().unwrap_or("<none>"))]
    KeyNotFound(Option<String>),
    #[error("unsupported algorithm `{0}` (only RS256 is accepted)")]
    UnsupportedAlgorithm(String),
    #[error("malformed token: {0}")]
    Malformed(String),
    #[error("token rejected: {0}")]
    Rejected(String),
    #[error("token has no `{0}` claim")]
    MissingClaim(String),
}

impl From<TokenValidationError> for AssignmentError {
    fn from(err: TokenValidationError) -> Self {
        AssignmentError::ClaimSource(Box::new(err))
    }
}
