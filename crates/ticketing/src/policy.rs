//! Authorization policy for ticket operations.
//!
//! One canonical rule per operation, applied uniformly:
//!
//! - change status: administrator or the ticket's creator
//! - comment: creator, assigned agent, or administrator
//! - read internal (non-public) comments: assigned agent or administrator
//! - delete, read audit trail: administrator only
//!
//! Assigned agents deliberately cannot change status; they work through
//! comments and an administrator (or the creator) moves the ticket.

use database::models::{Ticket, UserRole};

/// The authenticated identity performing an operation.
#[derive(Debug, Clone)]
pub struct Requester {
    /// Email, the identity used in ticket ownership fields.
    pub email: String,
    /// Role from the user record.
    pub role: UserRole,
}

impl Requester {
    pub fn new(email: impl Into<String>, role: UserRole) -> Self {
        Self {
            email: email.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// May `requester` change this ticket's status?
pub fn can_update_status(requester: &Requester, ticket: &Ticket) -> bool {
    requester.is_admin() || ticket.created_by == requester.email
}

/// May `requester` append a comment to this ticket?
pub fn can_comment(requester: &Requester, ticket: &Ticket) -> bool {
    requester.is_admin()
        || ticket.created_by == requester.email
        || ticket.assigned_to == requester.email
}

/// May `requester` read this ticket's internal notes?
pub fn can_see_internal_comments(requester: &Requester, ticket: &Ticket) -> bool {
    requester.is_admin() || ticket.assigned_to == requester.email
}

/// May `requester` delete tickets?
pub fn can_delete(requester: &Requester) -> bool {
    requester.is_admin()
}

/// May `requester` read audit trails?
pub fn can_read_audit(requester: &Requester) -> bool {
    requester.is_admin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use database::models::{TicketPriority, TicketStatus};
    use sqlx::types::Json;

    fn ticket() -> Ticket {
        Ticket {
            id: "t-1".to_string(),
            title: "Broken monitor".to_string(),
            description: "No signal.".to_string(),
            status: TicketStatus::Open,
            priority: TicketPriority::Normal,
            created_by: "creator@example.com".to_string(),
            assigned_to: "agent@example.com".to_string(),
            comments: Json(Vec::new()),
            created_at: "2026-01-01 00:00:00".to_string(),
            updated_at: "2026-01-01 00:00:00".to_string(),
        }
    }

    fn admin() -> Requester {
        Requester::new("admin@example.com", UserRole::Admin)
    }

    fn creator() -> Requester {
        Requester::new("creator@example.com", UserRole::User)
    }

    fn assigned_agent() -> Requester {
        Requester::new("agent@example.com", UserRole::Agent)
    }

    fn stranger() -> Requester {
        Requester::new("stranger@example.com", UserRole::User)
    }

    #[test]
    fn test_status_policy() {
        let t = ticket();
        assert!(can_update_status(&admin(), &t));
        assert!(can_update_status(&creator(), &t));
        assert!(!can_update_status(&assigned_agent(), &t));
        assert!(!can_update_status(&stranger(), &t));
    }

    #[test]
    fn test_comment_policy() {
        let t = ticket();
        assert!(can_comment(&admin(), &t));
        assert!(can_comment(&creator(), &t));
        assert!(can_comment(&assigned_agent(), &t));
        assert!(!can_comment(&stranger(), &t));
    }

    #[test]
    fn test_internal_comment_visibility() {
        let t = ticket();
        assert!(can_see_internal_comments(&admin(), &t));
        assert!(can_see_internal_comments(&assigned_agent(), &t));
        assert!(!can_see_internal_comments(&creator(), &t));
        assert!(!can_see_internal_comments(&stranger(), &t));
    }

    #[test]
    fn test_admin_only_operations() {
        assert!(can_delete(&admin()));
        assert!(!can_delete(&creator()));
        assert!(!can_delete(&assigned_agent()));

        assert!(can_read_audit(&admin()));
        assert!(!can_read_audit(&creator()));
        assert!(!can_read_audit(&assigned_agent()));
    }
}
