//! Domain primitives, the lending state machine and the services built on it.
//!
//! Purpose: keep lending rules independent of HTTP and storage. Inbound
//! adapters call the driving ports in [`ports`]; outbound adapters implement
//! the driven ports.
//!
//! Public surface:
//! - `Book`, `BookId`, `BookDetails`, `LendingState` — catalogue records.
//! - `lending::{borrow, return_book}` and `LendingError` — transition rules.
//! - `AuthorizationGate` — caller admission.
//! - `LendingService`, `CatalogueService`, `AccountService` — port impls.
//! - `Error`, `ErrorCode`, `TraceId` — transport-agnostic failures.

pub mod account_service;
pub mod auth;
pub mod authorization;
pub mod book;
pub mod catalogue_service;
pub mod error;
pub mod lending;
pub mod lending_service;
pub mod ports;
pub mod trace_id;
pub mod user;

pub use self::account_service::AccountService;
pub use self::auth::{
    CredentialsValidationError, LoginCredentials, PASSWORD_MIN, PasswordHash, RegistrationDetails,
};
pub use self::authorization::{AuthenticatedCaller, AuthorizationGate};
pub use self::book::{
    Author, Book, BookDetails, BookId, BookValidationError, LendingState, PublicationYear, Title,
};
pub use self::catalogue_service::CatalogueService;
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::lending::LendingError;
pub use self::lending_service::LendingService;
pub use self::trace_id::TraceId;
pub use self::user::{DisplayName, EmailAddress, User, UserId, UserValidationError, UserView};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use bookshelf::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::forbidden("nope"))
/// }
/// # assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
