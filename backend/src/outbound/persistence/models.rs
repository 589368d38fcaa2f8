//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; repositories convert them to
//! domain values through the validating constructors.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{books, users};

/// Row read from `users`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub display_name: String,
    pub email: String,
    pub password_hash: String,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub created_at: DateTime<Utc>,
}

/// Insertable `users` record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Row read from `books`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = books)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BookRow {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub is_borrowed: bool,
    pub borrower_id: Option<Uuid>,
    #[expect(dead_code, reason = "audit column read for completeness")]
    pub created_at: DateTime<Utc>,
}

/// Insertable `books` record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = books)]
pub(crate) struct NewBookRow<'a> {
    pub id: Uuid,
    pub title: &'a str,
    pub author: &'a str,
    pub year: i32,
    pub is_borrowed: bool,
    pub borrower_id: Option<Uuid>,
}

/// Changeset for catalogue details.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = books)]
pub(crate) struct BookDetailsUpdate<'a> {
    pub title: &'a str,
    pub author: &'a str,
    pub year: i32,
}

/// Changeset for the lending columns. `None` clears the borrower.
#[derive(Debug, Clone, Copy, AsChangeset)]
#[diesel(table_name = books)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct LendingUpdate {
    pub is_borrowed: bool,
    pub borrower_id: Option<Uuid>,
}
