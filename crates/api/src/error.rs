//! Error types for the API surface.
//!
//! Every error is serialized as `{"error": {"kind": ..., "detail": ...}}`
//! with a machine-readable kind and a human-readable detail, and scoped
//! to the request that raised it.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use database::DatabaseError;
use thiserror::Error;
use ticketing::TicketingError;

/// Errors that can occur handling an API request.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or invalid credentials/token.
    #[error("{0}")]
    Unauthenticated(String),

    /// Authenticated but policy-disallowed.
    #[error("{0}")]
    Forbidden(String),

    /// Referenced entity absent.
    #[error("{0}")]
    NotFound(String),

    /// Malformed request body, identifier, or enum value.
    #[error("{0}")]
    InvalidInput(String),

    /// Duplicate registration or concurrent modification.
    #[error("{0}")]
    Conflict(String),

    /// No active agents: a capacity problem, not a client error.
    #[error("no active agents are available to take new tickets")]
    AssignmentUnavailable,

    /// Mutation attempted on a terminal-state ticket.
    #[error("ticket is closed")]
    TicketClosed,

    /// Anything else.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Status code and machine-readable kind for this error.
    pub fn kind_and_status(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Unauthenticated(_) => (StatusCode::UNAUTHORIZED, "unauthenticated"),
            ApiError::Forbidden(_) => (StatusCode::FORBIDDEN, "forbidden"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::InvalidInput(_) => (StatusCode::BAD_REQUEST, "invalid_input"),
            ApiError::Conflict(_) => (StatusCode::CONFLICT, "conflict"),
            ApiError::AssignmentUnavailable => {
                (StatusCode::SERVICE_UNAVAILABLE, "assignment_unavailable")
            }
            ApiError::TicketClosed => (StatusCode::CONFLICT, "ticket_closed"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "internal"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind) = self.kind_and_status();

        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("Internal error: {}", self);
        }

        let body = serde_json::json!({
            "error": {
                "kind": kind,
                "detail": self.to_string(),
            }
        });

        (status, Json(body)).into_response()
    }
}

impl From<TicketingError> for ApiError {
    fn from(err: TicketingError) -> Self {
        match err {
            TicketingError::NotFound(msg) => ApiError::NotFound(msg),
            TicketingError::Forbidden(msg) => ApiError::Forbidden(msg),
            TicketingError::InvalidInput(msg) => ApiError::InvalidInput(msg),
            TicketingError::Conflict(msg) => ApiError::Conflict(msg),
            TicketingError::AssignmentUnavailable => ApiError::AssignmentUnavailable,
            TicketingError::TicketClosed => ApiError::TicketClosed,
            TicketingError::Database(err) => ApiError::from(err),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} not found: {}", entity, id))
            }
            DatabaseError::AlreadyExists { entity, id } => {
                ApiError::Conflict(format!("{} already exists: {}", entity, id))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

/// Result type for API handlers.
pub type Result<T> = std::result::Result<T, ApiError>;
