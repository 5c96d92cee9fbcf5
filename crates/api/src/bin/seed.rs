//! Seed sample agents into the roster.
//!
//! Bootstrap for a fresh deployment: inserts three active agents so
//! ticket creation has a rotation to draw from. Agents that already
//! exist are left untouched, so the tool is safe to re-run.

use database::{Database, DatabaseError};
use tracing::info;

const SAMPLE_AGENTS: &[(&str, &str)] = &[
    ("agent.a@example.com", "Agent A"),
    ("agent.b@example.com", "Agent B"),
    ("agent.c@example.com", "Agent C"),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let database_url = std::env::var("SQLITE_PATH")
        .unwrap_or_else(|_| "sqlite:helpdesk.db?mode=rwc".to_string());

    let db = Database::connect(&database_url).await?;
    db.migrate().await?;

    for (email, name) in SAMPLE_AGENTS {
        match database::agent::create_agent(db.pool(), email, name).await {
            Ok(agent) => info!(agent = %agent.email, "Seeded agent"),
            Err(DatabaseError::AlreadyExists { .. }) => {
                info!(agent = %email, "Agent already present, skipping");
            }
            Err(err) => return Err(err.into()),
        }
    }

    db.close().await;

    Ok(())
}
