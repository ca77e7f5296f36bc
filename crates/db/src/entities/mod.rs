//! Persisted records.
//!
//! Domain records are stored as JSON documents inside the key-value store;
//! only [`kv_entry`] is a relational table.

pub mod comic;
pub mod kv_entry;
pub mod review;
pub mod ticket;
pub mod user;

pub use comic::{Comic, ComicStatus};
pub use kv_entry::Entity as KvEntry;
pub use review::Review;
pub use ticket::{Ticket, TicketCategory, TicketPriority, TicketResponse, TicketStatus};
pub use user::{SessionUser, User, UserRole};
