//! Ticket routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use database::models::{AuditLogEntry, Comment, Ticket};
use serde::Deserialize;
use ticketing::{lifecycle, ListQuery, NewTicketRequest, TicketDetail, TicketPage};
use uuid::Uuid;

use crate::error::{ApiError, Result};
use crate::extract::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub priority: Option<String>,
}

/// Create a ticket; it is assigned to the next agent in rotation.
pub async fn create_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(request): Json<CreateTicketRequest>,
) -> Result<(StatusCode, Json<Ticket>)> {
    let ticket = lifecycle::create(
        state.db.pool(),
        &user.requester(),
        NewTicketRequest {
            title: request.title,
            description: request.description,
            priority: request.priority,
        },
    )
    .await?;

    Ok((StatusCode::CREATED, Json(ticket)))
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub mine: Option<bool>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub q: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// List tickets, most recently created first.
pub async fn list_tickets(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListParams>,
) -> Result<Json<TicketPage>> {
    let query = ListQuery {
        mine: params.mine.unwrap_or(false),
        status: params.status,
        priority: params.priority,
        q: params.q,
        page: params.page,
        page_size: params.page_size,
    };

    let page = lifecycle::list(state.db.pool(), &user.requester(), query).await?;
    Ok(Json(page))
}

/// Ticket detail with denormalized agent info and recent comments.
pub async fn ticket_detail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<TicketDetail>> {
    let id = parse_ticket_id(&id)?;
    let detail = lifecycle::detail(state.db.pool(), &user.requester(), &id).await?;
    Ok(Json(detail))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: String,
}

/// Change a ticket's status.
pub async fn update_status(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<Ticket>> {
    let id = parse_ticket_id(&id)?;
    let ticket =
        lifecycle::update_status(state.db.pool(), &user.requester(), &id, &request.status).await?;
    Ok(Json(ticket))
}

#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    pub body: String,
    /// Defaults to public; internal notes are only visible to the
    /// assigned agent and administrators.
    #[serde(default = "default_public")]
    pub public: bool,
}

fn default_public() -> bool {
    true
}

/// Append a comment to a ticket.
pub async fn add_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(request): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<Comment>)> {
    let id = parse_ticket_id(&id)?;
    let comment = lifecycle::add_comment(
        state.db.pool(),
        &user.requester(),
        &id,
        &request.body,
        request.public,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(comment)))
}

/// A ticket's audit trail. Administrators only.
pub async fn audit_trail(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<AuditLogEntry>>> {
    let id = parse_ticket_id(&id)?;
    let entries = lifecycle::audit_trail(state.db.pool(), &user.requester(), &id).await?;
    Ok(Json(entries))
}

/// Delete a ticket. Administrators only.
pub async fn delete_ticket(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let id = parse_ticket_id(&id)?;
    lifecycle::delete(state.db.pool(), &user.requester(), &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Ticket ids are opaque UUID strings; malformed ones are a 400, not a
/// store round-trip.
fn parse_ticket_id(raw: &str) -> Result<String> {
    Uuid::parse_str(raw)
        .map(|id| id.to_string())
        .map_err(|_| ApiError::InvalidInput(format!("malformed ticket id: {}", raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ticket_id() {
        let id = "c27fb365-0c84-4cf2-8555-814bb065e448";
        assert_eq!(parse_ticket_id(id).unwrap(), id);

        assert!(matches!(
            parse_ticket_id("42"),
            Err(ApiError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_ticket_id("not-a-uuid"),
            Err(ApiError::InvalidInput(_))
        ));
    }
}
