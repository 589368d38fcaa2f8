//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::warn;
use uuid::Uuid;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{DisplayName, EmailAddress, PasswordHash, User, UserId, UserValidationError};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Convert a batch of rows, skipping any that no longer validate so one bad
/// account cannot fail a whole listing.
fn users_from_rows(rows: &[UserRow]) -> Vec<User> {
    rows.iter()
        .filter_map(|row| match row_to_user(row) {
            Ok(user) => Some(user),
            Err(error) => {
                warn!(user_id = %row.id, %error, "skipping invalid user row");
                None
            }
        })
        .collect()
}

/// Diesel-backed implementation of the user directory port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: &diesel::result::Error, email: Option<&str>) -> UserPersistenceError {
    match (classify_diesel_error(error), email) {
        (DieselFailure::UniqueViolation, Some(email)) => {
            UserPersistenceError::duplicate_email(email)
        }
        (DieselFailure::Connection(message), _) => UserPersistenceError::connection(message),
        (DieselFailure::UniqueViolation, None) => {
            UserPersistenceError::query("unique constraint violated")
        }
        (DieselFailure::Query(message), _) => UserPersistenceError::query(message),
    }
}

fn row_to_user(row: &UserRow) -> Result<User, UserPersistenceError> {
    let invalid = |err: UserValidationError| {
        UserPersistenceError::query(format!("invalid stored user {}: {err}", row.id))
    };
    let display_name = DisplayName::new(row.display_name.as_str()).map_err(invalid)?;
    let email = EmailAddress::new(&row.email).map_err(invalid)?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        display_name,
        email,
        PasswordHash::new(row.password_hash.as_str()),
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let email = user.email().as_ref();

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            display_name: user.display_name().as_ref(),
            email,
            password_hash: user.password_hash().as_ref(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, Some(email)))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, None))?;

        row.as_ref().map(row_to_user).transpose()
    }

    async fn find_by_ids(&self, ids: &[UserId]) -> Result<Vec<User>, UserPersistenceError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let keys: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<UserRow> = users::table
            .filter(users::id.eq_any(keys))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, None))?;

        Ok(users_from_rows(&rows))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, None))?;

        row.as_ref().map(row_to_user).transpose()
    }
}
