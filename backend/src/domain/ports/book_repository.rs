//! Driven port for book persistence.
//!
//! Lending transitions are written through
//! [`BookRepository::update_lending_state`], a conditional single-record
//! update: the new state only lands if the stored state still equals the
//! state the decision was made against.

use async_trait::async_trait;

use crate::domain::{Book, BookDetails, BookId, LendingState};

use super::define_port_error;

define_port_error! {
    /// Errors raised by book repository adapters.
    pub enum BookRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "book repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "book repository query failed: {message}",
        /// Another book already uses this title.
        DuplicateTitle { title: String } => "a book titled {title} already exists",
    }
}

/// Store of book records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// Load one book.
    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookRepositoryError>;

    /// Load every book, ordered by title.
    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError>;

    /// Persist a new book.
    async fn insert(&self, book: &Book) -> Result<(), BookRepositoryError>;

    /// Replace catalogue details, leaving lending state untouched.
    ///
    /// Returns `None` when the book does not exist.
    async fn update_details(
        &self,
        id: &BookId,
        details: &BookDetails,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Set the lending state to `next` if it still equals `expected`.
    ///
    /// Returns the updated book, or `None` when no record matched (missing
    /// book or a state that moved on since it was loaded).
    async fn update_lending_state(
        &self,
        id: &BookId,
        expected: &LendingState,
        next: &LendingState,
    ) -> Result<Option<Book>, BookRepositoryError>;

    /// Remove a book. Returns whether a record was deleted.
    async fn delete(&self, id: &BookId) -> Result<bool, BookRepositoryError>;
}
