//! Error types for ticketing operations.

use database::{DatabaseError, ValidationError};
use thiserror::Error;

/// Errors that can occur in the ticketing core.
#[derive(Debug, Error)]
pub enum TicketingError {
    /// Referenced entity absent.
    #[error("not found: {0}")]
    NotFound(String),

    /// Authenticated but policy-disallowed.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Malformed request value (bad enum, bad length, empty field).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The entity changed concurrently; the request no longer applies.
    #[error("conflict: {0}")]
    Conflict(String),

    /// No active agents to assign a new ticket to.
    #[error("no active agents available for assignment")]
    AssignmentUnavailable,

    /// Mutation attempted on a closed ticket.
    #[error("ticket is closed")]
    TicketClosed,

    /// Persistence failure.
    #[error(transparent)]
    Database(DatabaseError),
}

impl From<DatabaseError> for TicketingError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => {
                TicketingError::NotFound(format!("{} {}", entity, id))
            }
            other => TicketingError::Database(other),
        }
    }
}

impl From<ValidationError> for TicketingError {
    fn from(err: ValidationError) -> Self {
        TicketingError::InvalidInput(err.to_string())
    }
}

/// Result type for ticketing operations.
pub type Result<T> = std::result::Result<T, TicketingError>;
