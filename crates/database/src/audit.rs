//! Append-only audit log.
//!
//! Entries are written once and never updated or deleted; there are
//! deliberately no mutation functions here.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::AuditLogEntry;

/// Record a mutating action on a ticket.
pub async fn append_entry(
    pool: &SqlitePool,
    ticket_id: &str,
    actor: &str,
    action: &str,
    detail: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO audit_log (ticket_id, actor, action, detail)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(ticket_id)
    .bind(actor)
    .bind(action)
    .bind(detail)
    .execute(pool)
    .await?;

    Ok(())
}

/// List a ticket's audit trail, oldest first.
pub async fn list_for_ticket(pool: &SqlitePool, ticket_id: &str) -> Result<Vec<AuditLogEntry>> {
    let entries = sqlx::query_as::<_, AuditLogEntry>(
        r#"
        SELECT id, ticket_id, actor, action, detail, created_at
        FROM audit_log
        WHERE ticket_id = ?
        ORDER BY id
        "#,
    )
    .bind(ticket_id)
    .fetch_all(pool)
    .await?;

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_db;

    #[tokio::test]
    async fn test_audit_trail_is_ordered() {
        let db = test_db().await;
        let pool = db.pool();

        append_entry(pool, "t-1", "u@example.com", "ticket.created", "assigned to a@example.com")
            .await
            .unwrap();
        append_entry(pool, "t-1", "u@example.com", "ticket.status_changed", "open -> closed")
            .await
            .unwrap();
        append_entry(pool, "t-2", "u@example.com", "ticket.created", "assigned to a@example.com")
            .await
            .unwrap();

        let trail = list_for_ticket(pool, "t-1").await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].action, "ticket.created");
        assert_eq!(trail[1].detail, "open -> closed");
    }
}
