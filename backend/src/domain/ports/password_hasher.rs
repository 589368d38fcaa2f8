//! Driven port for password hashing.
//!
//! The hashing scheme is an adapter concern; services only hash on
//! registration and verify on login.

use async_trait::async_trait;

use crate::domain::PasswordHash;

use super::define_port_error;

define_port_error! {
    /// Errors raised by password hasher adapters.
    pub enum PasswordHasherError {
        /// The stored digest could not be parsed.
        MalformedHash => "stored password hash is malformed",
        /// Deriving or checking a digest failed.
        Hashing { message: String } => "password hashing failed: {message}",
    }
}

/// Hashes and verifies passwords.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PasswordHasher: Send + Sync {
    /// Produce a salted digest of `password`.
    async fn hash(&self, password: &str) -> Result<PasswordHash, PasswordHasherError>;

    /// Check `password` against a digest produced by [`PasswordHasher::hash`].
    async fn verify(&self, password: &str, hash: &PasswordHash)
    -> Result<bool, PasswordHasherError>;
}
