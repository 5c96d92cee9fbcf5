//! Request authentication.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use database::models::{User, UserRole};
use ticketing::Requester;

use crate::error::ApiError;
use crate::state::AppState;

/// The authenticated user, extracted from a bearer token.
///
/// Validates the `Authorization: Bearer` token and loads the user row for
/// the token's subject. The role comes from the database rather than the
/// token, so a role change takes effect on outstanding tokens
/// immediately.
pub struct CurrentUser(pub User);

impl CurrentUser {
    /// The identity handed to the ticketing core.
    pub fn requester(&self) -> Requester {
        Requester::new(self.0.email.clone(), self.0.role)
    }

    /// Reject non-administrators.
    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.0.role != UserRole::Admin {
            return Err(ApiError::Forbidden(
                "administrator role required".to_string(),
            ));
        }
        Ok(())
    }
}

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .ok_or_else(|| ApiError::Unauthenticated("missing bearer token".to_string()))?;

        let claims = state
            .keys
            .validate(token)
            .map_err(|_| ApiError::Unauthenticated("invalid token".to_string()))?;

        let user = database::user::get_user_by_email(state.db.pool(), &claims.sub)
            .await
            .map_err(|_| ApiError::Unauthenticated("unknown user".to_string()))?;

        Ok(CurrentUser(user))
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let value = parts.headers.get(axum::http::header::AUTHORIZATION)?;
    let value = value.to_str().ok()?;
    value.strip_prefix("Bearer ")
}
