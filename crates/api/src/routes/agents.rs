//! Agent roster administration. All routes are administrator-only.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use database::models::Agent;
use database::validation;
use serde::Deserialize;
use tracing::info;

use crate::error::{ApiError, Result};
use crate::extract::CurrentUser;
use crate::state::AppState;

/// The full roster, active and inactive.
pub async fn list_agents(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Agent>>> {
    user.require_admin()?;

    let agents = database::agent::list_agents(state.db.pool()).await?;
    Ok(Json(agents))
}

#[derive(Debug, Deserialize)]
pub struct CreateAgentRequest {
    pub email: String,
    pub name: String,
}

/// Add an agent to the roster. New agents start active.
pub async fn create_agent(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateAgentRequest>,
) -> Result<(StatusCode, Json<Agent>)> {
    user.require_admin()?;

    validation::validate_email(&request.email)
        .map_err(|e| ApiError::InvalidInput(e.to_string()))?;
    validation::validate_name(&request.name).map_err(|e| ApiError::InvalidInput(e.to_string()))?;

    let email = request.email.trim().to_lowercase();
    let agent = database::agent::create_agent(state.db.pool(), &email, request.name.trim()).await?;

    info!(agent = %agent.email, "Added agent to roster");

    Ok((StatusCode::CREATED, Json(agent)))
}

#[derive(Debug, Deserialize)]
pub struct SetActiveRequest {
    pub is_active: bool,
}

/// Activate or deactivate an agent. Deactivated agents keep their
/// existing tickets but leave the assignment rotation.
pub async fn set_agent_active(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(email): Path<String>,
    Json(request): Json<SetActiveRequest>,
) -> Result<Json<Agent>> {
    user.require_admin()?;

    let agent =
        database::agent::set_agent_active(state.db.pool(), &email, request.is_active).await?;

    info!(agent = %agent.email, is_active = agent.is_active, "Updated agent activity");

    Ok(Json(agent))
}
