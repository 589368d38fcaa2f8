//! Driving port for account registration.

use async_trait::async_trait;

use crate::domain::{Error, RegistrationDetails, UserView};

/// Creates user accounts.
#[async_trait]
pub trait RegistrationService: Send + Sync {
    /// Register a new account. A taken email is a conflict.
    async fn register(&self, details: &RegistrationDetails) -> Result<UserView, Error>;
}
