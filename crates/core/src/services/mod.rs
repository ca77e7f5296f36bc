//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod comic;
pub mod review;
pub mod session;
pub mod statistics;
pub mod ticket;
pub mod user;
pub mod visitor;

pub use auth::{AuthService, RegisterInput};
pub use comic::{
    AuthorCount, ContentService, CreateComicInput, DEFAULT_TOP_AUTHORS, MAX_COMIC_PAGES,
    ModerationDecision, UpdateComicInput,
};
pub use review::{
    DEFAULT_RECENT_REVIEWS, MAX_COMMENT_CHARS, NewReview, ReviewBoard, ReviewInput,
};
pub use session::Session;
pub use statistics::{SiteOverview, StatisticsService};
pub use ticket::{
    DefaultTicketPolicy, GuestTicket, NewResponse, NewTicket, TicketDesk, TicketFilter,
    TicketInput, TicketPolicy, TicketStats,
};
pub use user::{NewUser, UserDirectory};
pub use visitor::VisitorCounter;
