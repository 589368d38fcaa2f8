//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call this port to authenticate credentials without
//! knowing the backing user directory or hashing scheme.

use async_trait::async_trait;

use crate::domain::{Error, LoginCredentials, UserId};

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown emails and wrong passwords fail identically with
    /// [`ErrorCode::Unauthorized`](crate::domain::ErrorCode::Unauthorized).
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;

    /// Whether the user named by a session still has an account.
    ///
    /// Agrees with the [`AuthorizationGate`](crate::domain::AuthorizationGate):
    /// a session for a removed account is not signed in.
    async fn is_signed_in(&self, user_id: &UserId) -> Result<bool, Error>;
}
