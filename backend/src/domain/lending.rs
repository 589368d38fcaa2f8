//! Borrow/return state machine.
//!
//! Transitions are pure: they inspect the freshly loaded [`Book`] and the
//! acting caller and either return the book in its next state or a
//! [`LendingError`]. Nothing here touches storage.
//!
//! ```text
//!   Available --borrow(U)--> Borrowed{by: U}
//!   Borrowed{by: U} --return(U)--> Available
//! ```

use serde_json::json;

use super::{Book, BookId, Error, LendingState, UserId};

/// Failure taxonomy for catalogue reads and lending transitions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LendingError {
    /// No signed-in caller, or the caller no longer exists.
    #[error("sign in to borrow or return books")]
    Unauthenticated,
    /// The book identifier does not resolve.
    #[error("book {0} was not found")]
    NotFound(BookId),
    /// Borrow attempted while the book is already lent out.
    #[error("book is already borrowed")]
    AlreadyBorrowed,
    /// Return attempted while the book is on the shelf.
    #[error("book is not borrowed")]
    NotBorrowed,
    /// Return attempted by someone other than the borrower.
    #[error("book is borrowed by another user")]
    NotYourBook,
    /// The record changed between load and write.
    #[error("book changed while the request was processed; try again")]
    ConcurrentModification,
    /// Persisting the transition failed.
    #[error("failed to save book: {0}")]
    WriteError(String),
    /// Loading books or users failed.
    #[error("book store unavailable: {0}")]
    StoreUnavailable(String),
}

impl LendingError {
    /// Stable detail code distinguishing conflict flavours for clients.
    pub fn detail_code(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::NotFound(_) => "not_found",
            Self::AlreadyBorrowed => "already_borrowed",
            Self::NotBorrowed => "not_borrowed",
            Self::NotYourBook => "not_your_book",
            Self::ConcurrentModification => "concurrent_modification",
            Self::WriteError(_) => "write_error",
            Self::StoreUnavailable(_) => "store_unavailable",
        }
    }
}

impl From<LendingError> for Error {
    fn from(value: LendingError) -> Self {
        let details = json!({ "code": value.detail_code() });
        match value {
            LendingError::Unauthenticated => Error::unauthorized(value.to_string()),
            LendingError::NotFound(id) => Error::not_found(value.to_string())
                .with_details(json!({ "code": "not_found", "bookId": id.to_string() })),
            LendingError::AlreadyBorrowed
            | LendingError::NotBorrowed
            | LendingError::ConcurrentModification => {
                Error::conflict(value.to_string()).with_details(details)
            }
            LendingError::NotYourBook => Error::forbidden(value.to_string()).with_details(details),
            LendingError::WriteError(_) | LendingError::StoreUnavailable(_) => {
                Error::service_unavailable(value.to_string()).with_details(details)
            }
        }
    }
}

/// Lend `book` to `caller`.
///
/// Legal only from [`LendingState::Available`]; a borrowed book rejects every
/// caller, its current borrower included.
///
/// # Examples
/// ```
/// use bookshelf::domain::{lending, Book, BookDetails, BookId, UserId};
///
/// let reader = UserId::random();
/// let book = Book::new(
///     BookId::random(),
///     BookDetails::try_from_parts("Dune", "Frank Herbert", 1965).unwrap(),
/// );
/// let lent = lending::borrow(&book, &reader).unwrap();
/// assert_eq!(lent.borrower(), Some(&reader));
/// ```
pub fn borrow(book: &Book, caller: &UserId) -> Result<Book, LendingError> {
    match book.lending() {
        LendingState::Available => Ok(book.with_lending(LendingState::Borrowed { by: *caller })),
        LendingState::Borrowed { .. } => Err(LendingError::AlreadyBorrowed),
    }
}

/// Hand `book` back on behalf of `caller`.
///
/// Legal only when `caller` is the recorded borrower.
pub fn return_book(book: &Book, caller: &UserId) -> Result<Book, LendingError> {
    match book.lending() {
        LendingState::Available => Err(LendingError::NotBorrowed),
        LendingState::Borrowed { by } if by == caller => {
            Ok(book.with_lending(LendingState::Available))
        }
        LendingState::Borrowed { .. } => Err(LendingError::NotYourBook),
    }
}
