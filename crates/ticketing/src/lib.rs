//! Agent assignment and ticket lifecycle for the helpdesk backend.
//!
//! This crate is the domain core between the HTTP surface and the
//! persistence layer:
//!
//! - [`assignment`] distributes new tickets across the active agent
//!   roster in strict round-robin order, backed by a persisted cursor
//!   that is advanced atomically.
//! - [`lifecycle`] owns ticket creation, listing, detail, authorized
//!   status transitions (`closed` is terminal), comment appends, and
//!   deletion, writing an audit entry for every mutation.
//! - [`policy`] is the single place authorization rules live.
//!
//! Every operation takes the requester's identity explicitly; nothing in
//! here reads ambient authentication state.

pub mod assignment;
pub mod error;
pub mod lifecycle;
pub mod policy;

pub use error::{Result, TicketingError};
pub use lifecycle::{
    AgentInfo, ListQuery, NewTicketRequest, TicketDetail, TicketPage, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
pub use policy::Requester;
