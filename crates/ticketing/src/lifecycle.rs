//! Ticket lifecycle operations.
//!
//! Owns creation (which pulls an agent from the assignment rotation),
//! authorized status transitions, comment appends, deletion, and the
//! audit trail. `closed` is terminal: once a ticket closes, its status
//! can never change again. Comments stay appendable on closed tickets;
//! the comment trail doubles as the human-readable audit record.

use chrono::Utc;
use database::models::{AuditLogEntry, Comment, NewTicket, Ticket, TicketPriority, TicketStatus};
use database::{validation, TicketFilter};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::SqlitePool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::assignment;
use crate::error::{Result, TicketingError};
use crate::policy::{self, Requester};

/// Page size applied when the caller does not pick one.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Server-enforced maximum page size.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Number of trailing comments returned on ticket detail.
const RECENT_COMMENT_LIMIT: usize = 20;

/// Input for ticket creation. Status, id, assignee, and timestamps are
/// all decided server-side.
#[derive(Debug, Clone)]
pub struct NewTicketRequest {
    pub title: String,
    pub description: String,
    /// Wire-form priority; defaults to `normal` when absent.
    pub priority: Option<String>,
}

/// Listing parameters, all optional.
#[derive(Debug, Clone, Default)]
pub struct ListQuery {
    /// Restrict to tickets created by or assigned to the requester.
    pub mine: bool,
    /// Wire-form status filter.
    pub status: Option<String>,
    /// Wire-form priority filter.
    pub priority: Option<String>,
    /// Free-text substring match over title and description.
    pub q: Option<String>,
    /// 1-based page number.
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// One page of tickets.
#[derive(Debug, Clone, Serialize)]
pub struct TicketPage {
    pub items: Vec<Ticket>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

/// Denormalized agent info attached to ticket detail.
#[derive(Debug, Clone, Serialize)]
pub struct AgentInfo {
    pub email: String,
    pub name: String,
    pub is_active: bool,
}

/// A ticket plus what the requester is allowed to see of its surroundings.
///
/// The embedded comment trail is trimmed to the most recent
/// [`RECENT_COMMENT_LIMIT`] comments visible to the requester; internal
/// notes are only included for the assigned agent and administrators.
#[derive(Debug, Clone, Serialize)]
pub struct TicketDetail {
    pub ticket: Ticket,
    /// Best-effort: `None` when the roster lookup fails or the agent
    /// record is gone, never an error.
    pub agent: Option<AgentInfo>,
}

/// Create a ticket, assigning it to the next agent in rotation.
///
/// Fails with [`TicketingError::AssignmentUnavailable`] when the active
/// roster is empty; the caller surfaces that as server capacity, not as
/// a client error.
pub async fn create(
    pool: &SqlitePool,
    requester: &Requester,
    request: NewTicketRequest,
) -> Result<Ticket> {
    validation::validate_title(&request.title)?;
    validation::validate_description(&request.description)?;
    let priority = match request.priority.as_deref() {
        None | Some("") => TicketPriority::Normal,
        Some(value) => parse_priority(value)?,
    };

    let agent = assignment::select_next_agent(pool).await?;

    let new_ticket = NewTicket {
        id: Uuid::new_v4().to_string(),
        title: request.title.trim().to_string(),
        description: request.description,
        priority,
        created_by: requester.email.clone(),
        assigned_to: agent.email.clone(),
    };
    let ticket = database::ticket::insert_ticket(pool, &new_ticket).await?;

    database::audit::append_entry(
        pool,
        &ticket.id,
        &requester.email,
        "ticket.created",
        &format!("assigned to {}", agent.email),
    )
    .await?;

    info!(ticket = %ticket.id, agent = %agent.email, "Created ticket");

    Ok(ticket)
}

/// List tickets matching `query`, most recently created first.
///
/// Listing returns ticket summaries: the embedded comment trails are
/// stripped. Comments, with their visibility rules applied, live on
/// [`detail`].
pub async fn list(
    pool: &SqlitePool,
    requester: &Requester,
    query: ListQuery,
) -> Result<TicketPage> {
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let filter = TicketFilter {
        involving: query.mine.then(|| requester.email.clone()),
        status: match query.status.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_status(value)?),
        },
        priority: match query.priority.as_deref() {
            None | Some("") => None,
            Some(value) => Some(parse_priority(value)?),
        },
        text: query.q.filter(|q| !q.trim().is_empty()),
    };

    let mut items = database::ticket::list_tickets(pool, &filter, page_size, (page - 1) * page_size)
        .await?;
    for ticket in &mut items {
        ticket.comments = Json(Vec::new());
    }
    let total = database::ticket::count_tickets(pool, &filter).await?;

    Ok(TicketPage {
        items,
        total,
        page,
        page_size,
    })
}

/// Fetch a ticket with denormalized agent info and its recent comments.
pub async fn detail(pool: &SqlitePool, requester: &Requester, id: &str) -> Result<TicketDetail> {
    let mut ticket = database::ticket::get_ticket(pool, id).await?;

    let agent = match database::agent::get_agent(pool, &ticket.assigned_to).await {
        Ok(agent) => Some(AgentInfo {
            email: agent.email,
            name: agent.name,
            is_active: agent.is_active,
        }),
        Err(err) => {
            warn!(ticket = %ticket.id, error = %err, "Agent lookup failed, returning partial detail");
            None
        }
    };

    let internal_ok = policy::can_see_internal_comments(requester, &ticket);
    let visible: Vec<Comment> = ticket
        .comments
        .0
        .iter()
        .filter(|c| c.public || internal_ok)
        .cloned()
        .collect();
    let start = visible.len().saturating_sub(RECENT_COMMENT_LIMIT);
    ticket.comments = Json(visible[start..].to_vec());

    Ok(TicketDetail { ticket, agent })
}

/// Change a ticket's status.
///
/// Allowed for administrators and the ticket's creator. The transition
/// must move to a different, valid state, and `closed` is terminal.
pub async fn update_status(
    pool: &SqlitePool,
    requester: &Requester,
    id: &str,
    new_status: &str,
) -> Result<Ticket> {
    let new_status = parse_status(new_status)?;

    let ticket = database::ticket::get_ticket(pool, id).await?;

    if !policy::can_update_status(requester, &ticket) {
        return Err(TicketingError::Forbidden(
            "only an administrator or the ticket creator can change status".to_string(),
        ));
    }
    if ticket.status == TicketStatus::Closed {
        return Err(TicketingError::TicketClosed);
    }
    if ticket.status == new_status {
        return Err(TicketingError::InvalidInput(format!(
            "ticket is already {}",
            new_status.as_str()
        )));
    }

    // Compare-and-swap against the status we just read; a concurrent
    // close between the read and this update must not be overwritten.
    let updated = database::ticket::set_status(pool, id, ticket.status, new_status).await?;
    let updated = match updated {
        Some(updated) => updated,
        None => {
            let current = database::ticket::get_ticket(pool, id).await?;
            if current.status == TicketStatus::Closed {
                return Err(TicketingError::TicketClosed);
            }
            return Err(TicketingError::Conflict(
                "ticket status changed concurrently, retry".to_string(),
            ));
        }
    };

    database::audit::append_entry(
        pool,
        id,
        &requester.email,
        "ticket.status_changed",
        &format!("{} -> {}", ticket.status.as_str(), new_status.as_str()),
    )
    .await?;

    info!(
        ticket = %id,
        old_status = ticket.status.as_str(),
        new_status = new_status.as_str(),
        "Changed ticket status"
    );

    Ok(updated)
}

/// Append a comment to a ticket.
///
/// Allowed for the creator, the assigned agent, and administrators;
/// permitted on closed tickets.
pub async fn add_comment(
    pool: &SqlitePool,
    requester: &Requester,
    id: &str,
    body: &str,
    public: bool,
) -> Result<Comment> {
    validation::validate_comment_body(body)?;

    let ticket = database::ticket::get_ticket(pool, id).await?;
    if !policy::can_comment(requester, &ticket) {
        return Err(TicketingError::Forbidden(
            "only the creator, the assigned agent, or an administrator may comment".to_string(),
        ));
    }

    let comment = Comment {
        author: requester.email.clone(),
        body: body.trim().to_string(),
        public,
        created_at: now_timestamp(),
    };
    database::ticket::append_comment(pool, id, &comment).await?;

    database::audit::append_entry(
        pool,
        id,
        &requester.email,
        "ticket.comment_added",
        if public { "public comment" } else { "internal note" },
    )
    .await?;

    Ok(comment)
}

/// Delete a ticket. Administrators only.
pub async fn delete(pool: &SqlitePool, requester: &Requester, id: &str) -> Result<()> {
    if !policy::can_delete(requester) {
        return Err(TicketingError::Forbidden(
            "only an administrator can delete tickets".to_string(),
        ));
    }

    database::ticket::delete_ticket(pool, id).await?;
    database::audit::append_entry(pool, id, &requester.email, "ticket.deleted", "").await?;

    info!(ticket = %id, "Deleted ticket");

    Ok(())
}

/// Read a ticket's audit trail. Administrators only.
///
/// Deliberately no existence check against the tickets table: the trail
/// of a deleted ticket stays readable under its old id.
pub async fn audit_trail(
    pool: &SqlitePool,
    requester: &Requester,
    id: &str,
) -> Result<Vec<AuditLogEntry>> {
    if !policy::can_read_audit(requester) {
        return Err(TicketingError::Forbidden(
            "only an administrator can read audit trails".to_string(),
        ));
    }

    let entries = database::audit::list_for_ticket(pool, id).await?;
    Ok(entries)
}

fn parse_status(value: &str) -> Result<TicketStatus> {
    TicketStatus::parse(value)
        .ok_or_else(|| TicketingError::InvalidInput(format!("unknown status: {}", value)))
}

fn parse_priority(value: &str) -> Result<TicketPriority> {
    TicketPriority::parse(value)
        .ok_or_else(|| TicketingError::InvalidInput(format!("unknown priority: {}", value)))
}

/// Server timestamp in the same format SQLite's `datetime('now')` writes.
fn now_timestamp() -> String {
    Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::test_db;
    use database::models::UserRole;

    async fn seed_roster(pool: &SqlitePool, emails: &[&str]) {
        for email in emails {
            database::agent::create_agent(pool, email, "Agent").await.unwrap();
        }
    }

    fn user(email: &str) -> Requester {
        Requester::new(email, UserRole::User)
    }

    fn agent(email: &str) -> Requester {
        Requester::new(email, UserRole::Agent)
    }

    fn admin() -> Requester {
        Requester::new("admin@example.com", UserRole::Admin)
    }

    fn request(title: &str) -> NewTicketRequest {
        NewTicketRequest {
            title: title.to_string(),
            description: "Something broke.".to_string(),
            priority: None,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_round_robin() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com", "b@example.com", "c@example.com"]).await;
        let alice = user("alice@example.com");

        let mut assigned = Vec::new();
        for i in 0..4 {
            let ticket = create(pool, &alice, request(&format!("Ticket {}", i)))
                .await
                .unwrap();
            assert_eq!(ticket.status, TicketStatus::Open);
            assert_eq!(ticket.priority, TicketPriority::Normal);
            assert_eq!(ticket.created_by, "alice@example.com");
            assigned.push(ticket.assigned_to);
        }

        assert_eq!(
            assigned,
            vec![
                "a@example.com",
                "b@example.com",
                "c@example.com",
                "a@example.com",
            ]
        );
    }

    #[tokio::test]
    async fn test_create_without_agents_fails() {
        let db = test_db().await;
        let pool = db.pool();

        let result = create(pool, &user("alice@example.com"), request("Helpless")).await;
        assert!(matches!(result, Err(TicketingError::AssignmentUnavailable)));
        assert_eq!(database::rotation::get_cursor(pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let result = create(pool, &alice, request("ab")).await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));

        let mut bad_priority = request("Valid title");
        bad_priority.priority = Some("whenever".to_string());
        let result = create(pool, &alice, bad_priority).await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));

        // Neither attempt may have advanced the rotation.
        assert_eq!(database::rotation::get_cursor(pool).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_then_detail_round_trip() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let created = create(pool, &alice, request("Round trip")).await.unwrap();
        let fetched = detail(pool, &alice, &created.id).await.unwrap();

        assert_eq!(fetched.ticket.title, created.title);
        assert_eq!(fetched.ticket.description, created.description);
        assert_eq!(fetched.ticket.status, created.status);
        assert_eq!(fetched.ticket.assigned_to, created.assigned_to);

        let agent = fetched.agent.expect("agent info should denormalize");
        assert_eq!(agent.email, "a@example.com");
        assert!(agent.is_active);
    }

    #[tokio::test]
    async fn test_list_mine_and_pagination() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");
        let bob = user("bob@example.com");

        for i in 0..15 {
            create(pool, &alice, request(&format!("Alice {}", i))).await.unwrap();
        }
        for i in 0..5 {
            create(pool, &bob, request(&format!("Bob {}", i))).await.unwrap();
        }

        // "mine" returns exactly the requester's tickets. Bob created 5;
        // none are assigned to him.
        let query = ListQuery {
            mine: true,
            ..Default::default()
        };
        let page = list(pool, &bob, query).await.unwrap();
        assert_eq!(page.total, 5);
        assert!(page.items.iter().all(|t| t.created_by == "bob@example.com"));

        // The sole agent sees everything as "mine".
        let query = ListQuery {
            mine: true,
            ..Default::default()
        };
        let page = list(pool, &agent("a@example.com"), query).await.unwrap();
        assert_eq!(page.total, 20);

        // Page 2 of size 10: items 11-20 of the newest-first ordering.
        let query = ListQuery {
            page: Some(2),
            page_size: Some(10),
            ..Default::default()
        };
        let page = list(pool, &alice, query).await.unwrap();
        assert_eq!(page.total, 20);
        assert_eq!(page.page, 2);
        assert_eq!(page.items.len(), 10);
        assert_eq!(page.items[0].title, "Alice 9");
        assert_eq!(page.items[9].title, "Alice 0");

        // Page size is clamped to the server maximum.
        let query = ListQuery {
            page_size: Some(10_000),
            ..Default::default()
        };
        let page = list(pool, &alice, query).await.unwrap();
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
    }

    #[tokio::test]
    async fn test_list_rejects_bad_filter() {
        let db = test_db().await;
        let pool = db.pool();

        let query = ListQuery {
            status: Some("resolved".to_string()),
            ..Default::default()
        };
        let result = list(pool, &user("alice@example.com"), query).await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let ticket = create(pool, &alice, request("Transitions")).await.unwrap();

        // Unknown status string.
        let result = update_status(pool, &alice, &ticket.id, "resolved").await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));

        // Same-state transition.
        let result = update_status(pool, &alice, &ticket.id, "open").await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));

        // open -> in_progress -> open -> closed, all by the creator.
        let t = update_status(pool, &alice, &ticket.id, "in_progress").await.unwrap();
        assert_eq!(t.status, TicketStatus::InProgress);
        let t = update_status(pool, &alice, &ticket.id, "open").await.unwrap();
        assert_eq!(t.status, TicketStatus::Open);
        let t = update_status(pool, &alice, &ticket.id, "closed").await.unwrap();
        assert_eq!(t.status, TicketStatus::Closed);

        // Closed is terminal.
        let result = update_status(pool, &alice, &ticket.id, "open").await;
        assert!(matches!(result, Err(TicketingError::TicketClosed)));
        let result = update_status(pool, &admin(), &ticket.id, "in_progress").await;
        assert!(matches!(result, Err(TicketingError::TicketClosed)));
    }

    #[tokio::test]
    async fn test_status_policy_enforced() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let ticket = create(pool, &alice, request("Policy")).await.unwrap();

        // The assigned agent cannot change status.
        let result = update_status(pool, &agent("a@example.com"), &ticket.id, "closed").await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));

        // Neither can a stranger.
        let result = update_status(pool, &user("mallory@example.com"), &ticket.id, "closed").await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));

        // An administrator can.
        let t = update_status(pool, &admin(), &ticket.id, "in_progress").await.unwrap();
        assert_eq!(t.status, TicketStatus::InProgress);

        // Absent ticket.
        let result = update_status(pool, &admin(), "no-such-id", "closed").await;
        assert!(matches!(result, Err(TicketingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_comments_and_visibility() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");
        let assigned = agent("a@example.com");

        let ticket = create(pool, &alice, request("Comments")).await.unwrap();

        add_comment(pool, &alice, &ticket.id, "It is still broken.", true)
            .await
            .unwrap();
        add_comment(pool, &assigned, &ticket.id, "Known issue, fix inbound.", false)
            .await
            .unwrap();

        // Strangers cannot comment.
        let result = add_comment(pool, &user("mallory@example.com"), &ticket.id, "me too", true).await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));

        // Empty bodies are rejected.
        let result = add_comment(pool, &alice, &ticket.id, "   ", true).await;
        assert!(matches!(result, Err(TicketingError::InvalidInput(_))));

        // The creator sees only public comments; the agent sees both.
        let seen = detail(pool, &alice, &ticket.id).await.unwrap();
        assert_eq!(seen.ticket.comments.0.len(), 1);
        assert!(seen.ticket.comments.0[0].public);
        let seen = detail(pool, &assigned, &ticket.id).await.unwrap();
        assert_eq!(seen.ticket.comments.0.len(), 2);

        // Listing returns summaries without comment trails.
        let page = list(pool, &assigned, ListQuery::default()).await.unwrap();
        assert!(page.items.iter().all(|t| t.comments.0.is_empty()));

        // Comments stay open after close.
        update_status(pool, &alice, &ticket.id, "closed").await.unwrap();
        add_comment(pool, &alice, &ticket.id, "Thanks, confirmed fixed.", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_delete_policy() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let ticket = create(pool, &alice, request("Delete me")).await.unwrap();

        // Not even the creator may delete; the ticket survives the attempt.
        let result = delete(pool, &alice, &ticket.id).await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));
        assert!(database::ticket::get_ticket(pool, &ticket.id).await.is_ok());

        delete(pool, &admin(), &ticket.id).await.unwrap();
        let result = database::ticket::get_ticket(pool, &ticket.id).await;
        assert!(result.is_err());

        let result = delete(pool, &admin(), &ticket.id).await;
        assert!(matches!(result, Err(TicketingError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_audit_trail() {
        let db = test_db().await;
        let pool = db.pool();
        seed_roster(pool, &["a@example.com"]).await;
        let alice = user("alice@example.com");

        let ticket = create(pool, &alice, request("Audited")).await.unwrap();
        update_status(pool, &alice, &ticket.id, "closed").await.unwrap();
        add_comment(pool, &alice, &ticket.id, "Closing note.", true)
            .await
            .unwrap();

        let result = audit_trail(pool, &alice, &ticket.id).await;
        assert!(matches!(result, Err(TicketingError::Forbidden(_))));

        let trail = audit_trail(pool, &admin(), &ticket.id).await.unwrap();
        let actions: Vec<&str> = trail.iter().map(|e| e.action.as_str()).collect();
        assert_eq!(
            actions,
            vec!["ticket.created", "ticket.status_changed", "ticket.comment_added"]
        );
        assert_eq!(trail[1].detail, "open -> closed");
    }
}
