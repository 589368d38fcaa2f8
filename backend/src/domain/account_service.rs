//! Account services: registration and login against the user directory.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    LoginService, PasswordHasher, PasswordHasherError, RegistrationService, UserPersistenceError,
    UserRepository,
};
use crate::domain::{
    AuthorizationGate, Error, LendingError, LoginCredentials, RegistrationDetails, User, UserId,
    UserView,
};

fn map_user_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => {
            Error::service_unavailable(format!("user repository unavailable: {message}"))
        }
        UserPersistenceError::Query { message } => {
            Error::internal(format!("user repository error: {message}"))
        }
        UserPersistenceError::DuplicateEmail { .. } => {
            Error::conflict("an account with this email already exists")
                .with_details(json!({ "field": "email", "code": "duplicate_email" }))
        }
    }
}

fn map_hasher_error(error: &PasswordHasherError) -> Error {
    Error::internal(format!("password hashing failed: {error}"))
}

fn invalid_credentials() -> Error {
    Error::unauthorized("invalid email or password")
}

/// Service implementing [`LoginService`] and [`RegistrationService`].
pub struct AccountService<U: ?Sized, H: ?Sized> {
    users: Arc<U>,
    hasher: Arc<H>,
}

impl<U: ?Sized, H: ?Sized> AccountService<U, H> {
    /// Create the service over a user directory and password hasher.
    pub fn new(users: Arc<U>, hasher: Arc<H>) -> Self {
        Self { users, hasher }
    }
}

#[async_trait]
impl<U, H> LoginService for AccountService<U, H>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let Some(user) = self
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?
        else {
            warn!("login attempt for unknown email");
            return Err(invalid_credentials());
        };

        let matches = self
            .hasher
            .verify(credentials.password(), user.password_hash())
            .await
            .map_err(|err| map_hasher_error(&err))?;
        if !matches {
            warn!(user_id = %user.id(), "login attempt with wrong password");
            return Err(invalid_credentials());
        }

        info!(user_id = %user.id(), "user signed in");
        Ok(*user.id())
    }

    async fn is_signed_in(&self, user_id: &UserId) -> Result<bool, Error> {
        match AuthorizationGate::new(Arc::clone(&self.users))
            .admit(Some(user_id))
            .await
        {
            Ok(_) => Ok(true),
            Err(LendingError::Unauthenticated) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl<U, H> RegistrationService for AccountService<U, H>
where
    U: UserRepository + ?Sized,
    H: PasswordHasher + ?Sized,
{
    async fn register(&self, details: &RegistrationDetails) -> Result<UserView, Error> {
        let password_hash = self
            .hasher
            .hash(details.password())
            .await
            .map_err(|err| map_hasher_error(&err))?;
        let user = User::new(
            UserId::random(),
            details.display_name().clone(),
            details.email().clone(),
            password_hash,
        );
        self.users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id(), "user registered");
        Ok(user.view())
    }
}
