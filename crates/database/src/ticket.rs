//! Ticket storage and queries.

use sqlx::{QueryBuilder, Sqlite, SqlitePool};

use crate::error::{DatabaseError, Result};
use crate::models::{Comment, NewTicket, Ticket, TicketPriority, TicketStatus};

/// Filter predicates for ticket listing.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    /// Restrict to tickets created by or assigned to this identity.
    pub involving: Option<String>,
    /// Status equality.
    pub status: Option<TicketStatus>,
    /// Priority equality.
    pub priority: Option<TicketPriority>,
    /// Substring match over title and description. SQLite LIKE is
    /// case-insensitive for ASCII, which is the contract here.
    pub text: Option<String>,
}

/// Insert a new ticket. Status starts `open`, timestamps are set by the
/// store.
pub async fn insert_ticket(pool: &SqlitePool, ticket: &NewTicket) -> Result<Ticket> {
    let created = sqlx::query_as::<_, Ticket>(
        r#"
        INSERT INTO tickets (id, title, description, priority, created_by, assigned_to)
        VALUES (?, ?, ?, ?, ?, ?)
        RETURNING id, title, description, status, priority, created_by, assigned_to,
                  comments, created_at, updated_at
        "#,
    )
    .bind(&ticket.id)
    .bind(&ticket.title)
    .bind(&ticket.description)
    .bind(ticket.priority)
    .bind(&ticket.created_by)
    .bind(&ticket.assigned_to)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Get a ticket by ID.
pub async fn get_ticket(pool: &SqlitePool, id: &str) -> Result<Ticket> {
    sqlx::query_as::<_, Ticket>(
        r#"
        SELECT id, title, description, status, priority, created_by, assigned_to,
               comments, created_at, updated_at
        FROM tickets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Ticket",
        id: id.to_string(),
    })
}

/// List tickets matching `filter`, most recently created first.
///
/// The sort is explicit: `created_at DESC` with rowid as tiebreak, so
/// same-second tickets come back in reverse insertion order instead of
/// whatever order the scan happens to visit.
pub async fn list_tickets(
    pool: &SqlitePool,
    filter: &TicketFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<Ticket>> {
    let mut qb = QueryBuilder::<Sqlite>::new(
        "SELECT id, title, description, status, priority, created_by, assigned_to, \
         comments, created_at, updated_at FROM tickets WHERE 1 = 1",
    );
    push_filters(&mut qb, filter);
    qb.push(" ORDER BY created_at DESC, rowid DESC LIMIT ")
        .push_bind(limit)
        .push(" OFFSET ")
        .push_bind(offset);

    let tickets = qb.build_query_as::<Ticket>().fetch_all(pool).await?;

    Ok(tickets)
}

/// Count tickets matching `filter`.
pub async fn count_tickets(pool: &SqlitePool, filter: &TicketFilter) -> Result<i64> {
    let mut qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM tickets WHERE 1 = 1");
    push_filters(&mut qb, filter);

    let count = qb.build_query_scalar::<i64>().fetch_one(pool).await?;

    Ok(count)
}

/// Compare-and-swap a ticket's status.
///
/// The row is only updated while it still holds `expected` and is not
/// closed, so a concurrent close can never be overwritten. Returns `None`
/// when nothing matched: the ticket is absent, already closed, or its
/// status moved under us.
pub async fn set_status(
    pool: &SqlitePool,
    id: &str,
    expected: TicketStatus,
    new_status: TicketStatus,
) -> Result<Option<Ticket>> {
    let updated = sqlx::query_as::<_, Ticket>(
        r#"
        UPDATE tickets
        SET status = ?, updated_at = datetime('now')
        WHERE id = ? AND status = ? AND status != 'closed'
        RETURNING id, title, description, status, priority, created_by, assigned_to,
                  comments, created_at, updated_at
        "#,
    )
    .bind(new_status)
    .bind(id)
    .bind(expected)
    .fetch_optional(pool)
    .await?;

    Ok(updated)
}

/// Append a comment to a ticket's embedded trail.
///
/// A single `json_insert` statement, so the append cannot interleave with
/// another writer's append to the same ticket.
pub async fn append_comment(pool: &SqlitePool, id: &str, comment: &Comment) -> Result<()> {
    let payload = serde_json::to_string(comment)?;

    let result = sqlx::query(
        r#"
        UPDATE tickets
        SET comments = json_insert(comments, '$[#]', json(?)),
            updated_at = datetime('now')
        WHERE id = ?
        "#,
    )
    .bind(payload)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Ticket",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// Delete a ticket by ID.
pub async fn delete_ticket(pool: &SqlitePool, id: &str) -> Result<()> {
    let result = sqlx::query(
        r#"
        DELETE FROM tickets
        WHERE id = ?
        "#,
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Ticket",
            id: id.to_string(),
        });
    }

    Ok(())
}

fn push_filters<'args>(qb: &mut QueryBuilder<'args, Sqlite>, filter: &'args TicketFilter) {
    if let Some(identity) = &filter.involving {
        qb.push(" AND (created_by = ")
            .push_bind(identity.as_str())
            .push(" OR assigned_to = ")
            .push_bind(identity.as_str())
            .push(")");
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(priority) = filter.priority {
        qb.push(" AND priority = ").push_bind(priority);
    }
    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        qb.push(" AND (title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }
}

/// Wrap user text in `%...%`, escaping LIKE metacharacters so they match
/// literally.
fn like_pattern(text: &str) -> String {
    let escaped = text
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}
