//! User account routes.

use axum::extract::State;
use axum::Json;
use database::models::{User, UserRole};
use serde::Serialize;

use crate::error::Result;
use crate::extract::CurrentUser;
use crate::state::AppState;

/// Public view of a user: everything except the password hash.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// The authenticated user's own profile.
pub async fn me(user: CurrentUser) -> Json<UserProfile> {
    Json(user.0.into())
}

/// List all users. Administrators only.
pub async fn list_users(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<UserProfile>>> {
    user.require_admin()?;

    let users = database::user::list_users(state.db.pool()).await?;
    Ok(Json(users.into_iter().map(UserProfile::from).collect()))
}
