//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driving ports (`CatalogueQuery`, `LendingCommand`, `CatalogueCommand`,
//! `LoginService`, `RegistrationService`) are called by inbound adapters.
//! Driven ports (`BookRepository`, `UserRepository`, `PasswordHasher`) are
//! implemented by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod book_repository;
mod catalogue_command;
mod catalogue_query;
mod lending_command;
mod login_service;
mod password_hasher;
mod registration_service;
mod user_repository;

#[cfg(test)]
pub use book_repository::MockBookRepository;
pub use book_repository::{BookRepository, BookRepositoryError};
pub use catalogue_command::{BookEdit, CatalogueCommand};
pub use catalogue_query::{CatalogueEntry, CatalogueQuery};
pub use lending_command::LendingCommand;
pub use login_service::LoginService;
#[cfg(test)]
pub use password_hasher::MockPasswordHasher;
pub use password_hasher::{PasswordHasher, PasswordHasherError};
pub use registration_service::RegistrationService;
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
