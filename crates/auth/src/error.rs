//! Credential error types.

use thiserror::Error;

/// Errors that can occur issuing or validating credentials.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Token failed validation. Deliberately opaque: callers never learn
    /// whether the signature, expiry, or shape was the problem.
    #[error("invalid token")]
    InvalidToken,

    /// Token signing failed.
    #[error("token signing failed: {0}")]
    TokenIssue(jsonwebtoken::errors::Error),
}

/// Result type for credential operations.
pub type Result<T> = std::result::Result<T, AuthError>;
