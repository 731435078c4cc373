use thiserror::Error;

/// Error type for JWT operations.
///
/// The validation variants stay distinct for diagnostics; callers facing
/// clients are expected to collapse them into a single "invalid token" reply.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JwtError {
    #[error("Failed to encode token: {0}")]
    EncodingFailed(String),

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token signature is invalid")]
    SignatureInvalid,

    #[error("Token is expired")]
    Expired,

    #[error("Token signing algorithm is not accepted")]
    AlgorithmMismatch,

    #[error("Token subject is not a non-negative integer")]
    InvalidSubject,

    #[error("Token claims are invalid: {0}")]
    InvalidClaims(String),
}
