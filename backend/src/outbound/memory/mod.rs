//! Process-local adapters for the driven ports.
//!
//! Used when no database URL is configured and by the behaviour tests. State
//! lives behind a `std::sync::Mutex` and is lost on restart. Each operation
//! takes the lock once, so the conditional lending update is atomic here too.

mod book_repository;
mod user_repository;

pub use book_repository::InMemoryBookRepository;
pub use user_repository::InMemoryUserRepository;
