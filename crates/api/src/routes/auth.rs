//! Signup and login routes.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use database::models::{NewUser, UserRole};
use database::validation;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::state::AppState;

/// Minimum accepted password length.
const MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub id: String,
    pub email: String,
}

/// Register a new user account with the `user` role.
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>)> {
    validation::validate_email(&request.email)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    validation::validate_name(&request.name).map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::InvalidInput(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let new_user = NewUser {
        id: Uuid::new_v4().to_string(),
        email: request.email.trim().to_lowercase(),
        name: request.name.trim().to_string(),
        password_hash: auth::password::hash(&request.password),
        role: UserRole::User,
    };

    // Duplicate email surfaces as a 409 conflict.
    let user = database::user::create_user(state.db.pool(), &new_user).await?;

    info!(user = %user.email, "Registered user");

    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            id: user.id,
            email: user.email,
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub token_type: String,
}

/// Exchange credentials for a bearer token.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    let email = request.email.trim().to_lowercase();

    let user = match database::user::get_user_by_email(state.db.pool(), &email).await {
        Ok(user) => user,
        Err(_) => return Err(invalid_credentials()),
    };

    if !auth::password::verify(&request.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let token = state
        .keys
        .issue(&user.email, user.role.as_str())
        .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok(Json(LoginResponse {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Same answer for unknown email and wrong password.
fn invalid_credentials() -> ApiError {
    ApiError::Unauthenticated("invalid email or password".to_string())
}
