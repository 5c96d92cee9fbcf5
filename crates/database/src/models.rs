//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Role assigned to a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum UserRole {
    User,
    Agent,
    Admin,
}

impl UserRole {
    /// Parse a role from its wire form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "user" => Some(UserRole::User),
            "agent" => Some(UserRole::Agent),
            "admin" => Some(UserRole::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Agent => "agent",
            UserRole::Admin => "admin",
        }
    }
}

/// Lifecycle state of a ticket. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketStatus {
    Open,
    InProgress,
    Closed,
}

impl TicketStatus {
    /// Parse a status from its wire form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(TicketStatus::Open),
            "in_progress" => Some(TicketStatus::InProgress),
            "closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketStatus::Open => "open",
            TicketStatus::InProgress => "in_progress",
            TicketStatus::Closed => "closed",
        }
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum TicketPriority {
    Low,
    Normal,
    High,
    Urgent,
}

impl TicketPriority {
    /// Parse a priority from its wire form.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(TicketPriority::Low),
            "normal" => Some(TicketPriority::Normal),
            "high" => Some(TicketPriority::High),
            "urgent" => Some(TicketPriority::Urgent),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TicketPriority::Low => "low",
            TicketPriority::Normal => "normal",
            TicketPriority::High => "high",
            TicketPriority::Urgent => "urgent",
        }
    }
}

/// A registered user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// UUID, string-encoded.
    pub id: String,
    /// Unique email, the user's identity everywhere else in the system.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Salted password hash. Never serialized onto the wire by the API.
    pub password_hash: String,
    /// Authorization role.
    pub role: UserRole,
    /// Creation timestamp (server-side).
    pub created_at: String,
}

/// Fields required to create a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: UserRole,
}

/// A support agent in the roster, keyed by email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Agent {
    /// Email, the roster key.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Inactive agents never receive assignments.
    pub is_active: bool,
    /// Creation timestamp (server-side).
    pub created_at: String,
}

/// A comment embedded in a ticket's comment trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Author email.
    pub author: String,
    /// Comment text.
    pub body: String,
    /// Non-public comments are internal notes, shown only to the assigned
    /// agent and administrators.
    pub public: bool,
    /// Creation timestamp (server-side).
    pub created_at: String,
}

/// A support ticket.
///
/// Comments are embedded in the ticket row as a JSON array so that a
/// ticket and its comment trail share one atomically-updated document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Ticket {
    /// UUID, string-encoded.
    pub id: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    /// Creator email.
    pub created_by: String,
    /// Assigned agent email. Every ticket has exactly one from creation on.
    pub assigned_to: String,
    /// Embedded comment trail, oldest first.
    pub comments: Json<Vec<Comment>>,
    /// Creation timestamp (server-side).
    pub created_at: String,
    /// Last mutation timestamp.
    pub updated_at: String,
}

/// Fields required to insert a ticket. Status and timestamps are set by
/// the store, never by the caller.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub id: String,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
    pub created_by: String,
    pub assigned_to: String,
}

/// An append-only record of a mutating action on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct AuditLogEntry {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Ticket the action applied to.
    pub ticket_id: String,
    /// Email of the user who acted.
    pub actor: String,
    /// Action name, e.g. "ticket.status_changed".
    pub action: String,
    /// What changed, e.g. "open -> closed".
    pub detail: String,
    /// Creation timestamp (server-side).
    pub created_at: String,
}
