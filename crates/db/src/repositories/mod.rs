//! Repositories, one per stored collection.

pub mod comic;
pub mod review;
pub mod session;
pub mod ticket;
pub mod user;
pub mod visitor;

pub use comic::ComicRepository;
pub use review::ReviewRepository;
pub use session::SessionRepository;
pub use ticket::TicketRepository;
pub use user::UserRepository;
pub use visitor::VisitorRepository;
