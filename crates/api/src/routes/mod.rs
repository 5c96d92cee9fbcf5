//! Route handlers for the helpdesk API.

pub mod agents;
pub mod auth;
pub mod health;
pub mod tickets;
pub mod users;

use axum::routing::{get, patch, post};
use axum::Router;

use crate::state::AppState;

/// Build the router with all routes.
pub fn router() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/health", get(health::health))
        // Authentication
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        // Users
        .route("/users", get(users::list_users))
        .route("/users/me", get(users::me))
        // Tickets
        .route("/tickets", post(tickets::create_ticket).get(tickets::list_tickets))
        .route(
            "/tickets/:id",
            get(tickets::ticket_detail).delete(tickets::delete_ticket),
        )
        .route("/tickets/:id/status", patch(tickets::update_status))
        .route("/tickets/:id/comments", post(tickets::add_comment))
        .route("/tickets/:id/audit", get(tickets::audit_trail))
        // Agent roster administration
        .route("/agents", get(agents::list_agents).post(agents::create_agent))
        .route("/agents/:email", patch(agents::set_agent_active))
}
