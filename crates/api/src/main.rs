//! Helpdesk API server.
//!
//! Axum HTTP surface over the ticketing core: signup and login, ticket
//! creation with automatic round-robin agent assignment, listing and
//! detail, status transitions, comments, and administrative operations
//! on the agent roster.

mod config;
mod error;
mod extract;
mod routes;
mod state;

use database::Database;
use tracing::info;

use crate::config::Config;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    info!(addr = %config.addr, "Starting helpdesk API server");

    // Connect to database
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    // Build application state
    let keys = auth::Keys::new(&config.jwt_secret, config.token_ttl_minutes);
    let state = AppState::new(db, keys);

    // Build router
    let app = routes::router().with_state(state);

    // Start server
    info!(addr = %config.addr, "Helpdesk API listening");
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
