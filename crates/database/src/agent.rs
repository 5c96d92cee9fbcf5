//! Agent roster operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::Agent;

/// Add an agent to the roster.
pub async fn create_agent(pool: &SqlitePool, email: &str, name: &str) -> Result<Agent> {
    sqlx::query_as::<_, Agent>(
        r#"
        INSERT INTO agents (email, name)
        VALUES (?, ?)
        RETURNING email, name, is_active, created_at
        "#,
    )
    .bind(email)
    .bind(name)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if let sqlx::Error::Database(ref db_err) = e {
            if db_err.is_unique_violation() {
                return DatabaseError::AlreadyExists {
                    entity: "Agent",
                    id: email.to_string(),
                };
            }
        }
        DatabaseError::Sqlx(e)
    })
}

/// Get an agent by email.
pub async fn get_agent(pool: &SqlitePool, email: &str) -> Result<Agent> {
    sqlx::query_as::<_, Agent>(
        r#"
        SELECT email, name, is_active, created_at
        FROM agents
        WHERE email = ?
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Agent",
        id: email.to_string(),
    })
}

/// List the whole roster, active or not.
pub async fn list_agents(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(
        r#"
        SELECT email, name, is_active, created_at
        FROM agents
        ORDER BY email
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(agents)
}

/// List active agents in rotation order.
///
/// The ordering is the rotation's frame of reference: the cursor indexes
/// into exactly this list, so it must be stable across calls. Email is the
/// stable key.
pub async fn list_active_agents(pool: &SqlitePool) -> Result<Vec<Agent>> {
    let agents = sqlx::query_as::<_, Agent>(
        r#"
        SELECT email, name, is_active, created_at
        FROM agents
        WHERE is_active = 1
        ORDER BY email
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(agents)
}

/// Activate or deactivate an agent.
pub async fn set_agent_active(pool: &SqlitePool, email: &str, active: bool) -> Result<Agent> {
    sqlx::query_as::<_, Agent>(
        r#"
        UPDATE agents
        SET is_active = ?
        WHERE email = ?
        RETURNING email, name, is_active, created_at
        "#,
    )
    .bind(active)
    .bind(email)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Agent",
        id: email.to_string(),
    })
}

/// Count active agents.
pub async fn count_active_agents(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM agents WHERE is_active = 1
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
