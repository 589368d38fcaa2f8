//! PostgreSQL-backed `BookRepository` implementation using Diesel ORM.
//!
//! Lending transitions are compare-and-set updates: the `WHERE` clause pins
//! the lending columns to the state the caller decided against, so a
//! concurrent writer that got there first makes the update match zero rows.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{BookRepository, BookRepositoryError};
use crate::domain::{Book, BookDetails, BookId, LendingState, UserId};

use super::diesel_error_mapping::{DieselFailure, classify_diesel_error};
use super::models::{BookDetailsUpdate, BookRow, LendingUpdate, NewBookRow};
use super::pool::{DbPool, PoolError};
use super::schema::books;

/// Diesel-backed implementation of the book repository port.
#[derive(Clone)]
pub struct DieselBookRepository {
    pool: DbPool,
}

impl DieselBookRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> BookRepositoryError {
    BookRepositoryError::connection(error.into_message())
}

fn map_diesel_error(error: &diesel::result::Error, title: Option<&str>) -> BookRepositoryError {
    match (classify_diesel_error(error), title) {
        (DieselFailure::UniqueViolation, Some(title)) => {
            BookRepositoryError::duplicate_title(title)
        }
        (DieselFailure::Connection(message), _) => BookRepositoryError::connection(message),
        (DieselFailure::UniqueViolation, None) => {
            BookRepositoryError::query("unique constraint violated")
        }
        (DieselFailure::Query(message), _) => BookRepositoryError::query(message),
    }
}

fn lending_update(state: &LendingState) -> LendingUpdate {
    LendingUpdate {
        is_borrowed: state.is_borrowed(),
        borrower_id: state.borrower().map(|id| *id.as_uuid()),
    }
}

/// Convert a database row to a domain book.
///
/// Rows that fail domain validation are reported as query errors rather than
/// silently repaired.
fn row_to_book(row: &BookRow) -> Result<Book, BookRepositoryError> {
    let details = BookDetails::try_from_parts(&row.title, &row.author, row.year).map_err(|err| {
        BookRepositoryError::query(format!("invalid stored book {}: {err}", row.id))
    })?;
    let lending = LendingState::from_columns(row.is_borrowed, row.borrower_id.map(UserId::from_uuid))
        .map_err(|err| {
            BookRepositoryError::query(format!("invalid stored book {}: {err}", row.id))
        })?;
    Ok(Book::restore(BookId::from_uuid(row.id), details, lending))
}

#[async_trait]
impl BookRepository for DieselBookRepository {
    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<BookRow> = books::table
            .filter(books::id.eq(id.as_uuid()))
            .select(BookRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, None))?;

        row.as_ref().map(row_to_book).transpose()
    }

    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<BookRow> = books::table
            .order((books::title.asc(), books::id.asc()))
            .select(BookRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, None))?;

        rows.iter().map(row_to_book).collect()
    }

    async fn insert(&self, book: &Book) -> Result<(), BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let details = book.details();
        let lending = lending_update(book.lending());
        let title = details.title().as_ref();

        let row = NewBookRow {
            id: *book.id().as_uuid(),
            title,
            author: details.author().as_ref(),
            year: details.year().value(),
            is_borrowed: lending.is_borrowed,
            borrower_id: lending.borrower_id,
        };

        diesel::insert_into(books::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, Some(title)))?;
        Ok(())
    }

    async fn update_details(
        &self,
        id: &BookId,
        details: &BookDetails,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let title = details.title().as_ref();

        let changes = BookDetailsUpdate {
            title,
            author: details.author().as_ref(),
            year: details.year().value(),
        };

        let row: Option<BookRow> = diesel::update(books::table.filter(books::id.eq(id.as_uuid())))
            .set(&changes)
            .returning(BookRow::as_returning())
            .get_result(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, Some(title)))?;

        row.as_ref().map(row_to_book).transpose()
    }

    async fn update_lending_state(
        &self,
        id: &BookId,
        expected: &LendingState,
        next: &LendingState,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changes = lending_update(next);

        let result = match expected {
            LendingState::Available => {
                diesel::update(
                    books::table
                        .filter(books::id.eq(id.as_uuid()))
                        .filter(books::is_borrowed.eq(false))
                        .filter(books::borrower_id.is_null()),
                )
                .set(changes)
                .returning(BookRow::as_returning())
                .get_result(&mut conn)
                .await
            }
            LendingState::Borrowed { by } => {
                diesel::update(
                    books::table
                        .filter(books::id.eq(id.as_uuid()))
                        .filter(books::is_borrowed.eq(true))
                        .filter(books::borrower_id.eq(by.as_uuid())),
                )
                .set(changes)
                .returning(BookRow::as_returning())
                .get_result(&mut conn)
                .await
            }
        };

        let row: Option<BookRow> = result
            .optional()
            .map_err(|err| map_diesel_error(&err, None))?;
        if row.is_none() {
            debug!(book_id = %id, "lending update matched no row");
        }
        row.as_ref().map(row_to_book).transpose()
    }

    async fn delete(&self, id: &BookId) -> Result<bool, BookRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let removed = diesel::delete(books::table.filter(books::id.eq(id.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, None))?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Row conversion and error mapping; queries need a live database.
    use super::*;
    use chrono::Utc;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;
    use uuid::Uuid;

    fn row(is_borrowed: bool, borrower_id: Option<Uuid>) -> BookRow {
        BookRow {
            id: Uuid::new_v4(),
            title: "Dune".to_owned(),
            author: "Frank Herbert".to_owned(),
            year: 1965,
            is_borrowed,
            borrower_id,
            created_at: Utc::now(),
        }
    }

    #[rstest]
    fn available_row_converts() {
        let book = row_to_book(&row(false, None)).expect("valid row");
        assert_eq!(book.details().title().as_ref(), "Dune");
        assert!(!book.is_borrowed());
    }

    #[rstest]
    fn borrowed_row_keeps_borrower() {
        let reader = Uuid::new_v4();
        let book = row_to_book(&row(true, Some(reader))).expect("valid row");
        assert_eq!(book.borrower(), Some(&UserId::from_uuid(reader)));
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(Uuid::new_v4()))]
    fn inconsistent_lending_columns_are_rejected(
        #[case] is_borrowed: bool,
        #[case] borrower_id: Option<Uuid>,
    ) {
        let err = row_to_book(&row(is_borrowed, borrower_id)).expect_err("inconsistent row");
        assert!(matches!(err, BookRepositoryError::Query { .. }));
    }

    #[rstest]
    fn blank_stored_title_is_rejected() {
        let mut bad = row(false, None);
        bad.title = "   ".to_owned();
        let err = row_to_book(&bad).expect_err("blank title");
        assert!(err.to_string().contains("invalid stored book"));
    }

    #[rstest]
    fn lending_update_mirrors_state() {
        let reader = UserId::random();
        let borrowed = lending_update(&LendingState::Borrowed { by: reader });
        assert!(borrowed.is_borrowed);
        assert_eq!(borrowed.borrower_id, Some(*reader.as_uuid()));

        let available = lending_update(&LendingState::Available);
        assert!(!available.is_borrowed);
        assert_eq!(available.borrower_id, None);
    }

    #[rstest]
    fn unique_violation_on_write_names_the_title() {
        let err = map_diesel_error(
            &DieselError::DatabaseError(
                DatabaseErrorKind::UniqueViolation,
                Box::new("duplicate key".to_owned()),
            ),
            Some("Dune"),
        );
        assert_eq!(err, BookRepositoryError::duplicate_title("Dune"));
    }

    #[rstest]
    fn closed_connection_maps_to_connection_error() {
        let err = map_diesel_error(
            &DieselError::DatabaseError(
                DatabaseErrorKind::ClosedConnection,
                Box::new("closed".to_owned()),
            ),
            None,
        );
        assert!(matches!(err, BookRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn pool_errors_map_to_connection_error() {
        let err = map_pool_error(PoolError::Checkout {
            message: "timed out".to_owned(),
        });
        assert_eq!(err, BookRepositoryError::connection("timed out"));
    }
}
