//! Catalogue upkeep service: add, edit and remove books.
//!
//! Lending state is never touched here; edits only replace catalogue details.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::info;

use crate::domain::authorization::AuthorizationGate;
use crate::domain::ports::{
    BookEdit, BookRepository, BookRepositoryError, CatalogueCommand, UserRepository,
};
use crate::domain::{Book, BookDetails, BookId, Error, UserId};

fn map_repository_error(error: BookRepositoryError) -> Error {
    match error {
        BookRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("book repository unavailable: {message}"))
        }
        BookRepositoryError::Query { message } => {
            Error::internal(format!("book repository error: {message}"))
        }
        BookRepositoryError::DuplicateTitle { title } => {
            Error::conflict(format!("a book titled \"{title}\" already exists"))
                .with_details(json!({ "field": "title", "code": "duplicate_title" }))
        }
    }
}

fn not_found(book_id: &BookId) -> Error {
    Error::not_found(format!("book {book_id} was not found"))
}

/// Service implementing [`CatalogueCommand`].
pub struct CatalogueService<B: ?Sized, U: ?Sized> {
    books: Arc<B>,
    gate: AuthorizationGate<U>,
}

impl<B, U> CatalogueService<B, U>
where
    B: BookRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    /// Create the service over a book store and user directory.
    pub fn new(books: Arc<B>, users: Arc<U>) -> Self {
        Self {
            books,
            gate: AuthorizationGate::new(users),
        }
    }
}

#[async_trait]
impl<B, U> CatalogueCommand for CatalogueService<B, U>
where
    B: BookRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn add_book(
        &self,
        details: BookDetails,
        caller: Option<&UserId>,
    ) -> Result<Book, Error> {
        let caller = self.gate.admit(caller).await?;
        let book = Book::new(BookId::random(), details);
        self.books
            .insert(&book)
            .await
            .map_err(map_repository_error)?;
        info!(book_id = %book.id(), user_id = %caller.id(), "book added");
        Ok(book)
    }

    async fn edit_book(
        &self,
        book_id: &BookId,
        edit: &BookEdit,
        caller: Option<&UserId>,
    ) -> Result<Book, Error> {
        let caller = self.gate.admit(caller).await?;
        let current = self
            .books
            .find_by_id(book_id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(book_id))?;
        if edit.is_empty() {
            return Ok(current);
        }

        let details = edit.apply(current.details());
        let updated = self
            .books
            .update_details(book_id, &details)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| not_found(book_id))?;
        info!(book_id = %book_id, user_id = %caller.id(), "book edited");
        Ok(updated)
    }

    async fn remove_book(&self, book_id: &BookId, caller: Option<&UserId>) -> Result<(), Error> {
        let caller = self.gate.admit(caller).await?;
        let deleted = self
            .books
            .delete(book_id)
            .await
            .map_err(map_repository_error)?;
        if !deleted {
            return Err(not_found(book_id));
        }
        info!(book_id = %book_id, user_id = %caller.id(), "book removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;
    use crate::domain::ports::{MockBookRepository, MockUserRepository};
    use crate::domain::{
        DisplayName, EmailAddress, ErrorCode, LendingState, PasswordHash, User,
    };

    #[fixture]
    fn librarian() -> UserId {
        UserId::random()
    }

    fn directory(id: UserId) -> MockUserRepository {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().return_once(move |_| {
            Ok(Some(User::new(
                id,
                DisplayName::new("Librarian").expect("valid name"),
                EmailAddress::new("desk@example.com").expect("valid email"),
                PasswordHash::new("salt$digest"),
            )))
        });
        users
    }

    fn dune() -> BookDetails {
        BookDetails::try_from_parts("Dune", "Frank Herbert", 1965).expect("valid details")
    }

    fn service(
        books: MockBookRepository,
        users: MockUserRepository,
    ) -> CatalogueService<MockBookRepository, MockUserRepository> {
        CatalogueService::new(Arc::new(books), Arc::new(users))
    }

    #[rstest]
    #[tokio::test]
    async fn add_book_inserts_available_book(librarian: UserId) {
        let mut books = MockBookRepository::new();
        books
            .expect_insert()
            .withf(|book| !book.is_borrowed() && book.details().title().as_ref() == "Dune")
            .times(1)
            .return_once(|_| Ok(()));

        let book = service(books, directory(librarian))
            .add_book(dune(), Some(&librarian))
            .await
            .expect("add succeeds");

        assert_eq!(book.lending(), &LendingState::Available);
    }

    #[rstest]
    #[tokio::test]
    async fn add_book_requires_caller() {
        let mut books = MockBookRepository::new();
        books.expect_insert().times(0);

        let error = service(books, MockUserRepository::new())
            .add_book(dune(), None)
            .await
            .expect_err("anonymous add is rejected");

        assert_eq!(error.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_title_is_conflict(librarian: UserId) {
        let mut books = MockBookRepository::new();
        books
            .expect_insert()
            .return_once(|_| Err(BookRepositoryError::duplicate_title("Dune")));

        let error = service(books, directory(librarian))
            .add_book(dune(), Some(&librarian))
            .await
            .expect_err("duplicate title");

        assert_eq!(error.code(), ErrorCode::Conflict);
    }

    #[rstest]
    #[tokio::test]
    async fn edit_merges_over_current_details(librarian: UserId) {
        let current = Book::restore(
            BookId::random(),
            dune(),
            LendingState::Borrowed { by: librarian },
        );
        let book_id = *current.id();
        let edit = BookEdit::try_from_parts(None, None, Some(1966)).expect("valid edit");
        let stored = current.with_details(edit.apply(current.details()));

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(current)));
        books
            .expect_update_details()
            .withf(|_, details| {
                details.title().as_ref() == "Dune" && details.year().value() == 1966
            })
            .times(1)
            .return_once(move |_, _| Ok(Some(stored)));

        let book = service(books, directory(librarian))
            .edit_book(&book_id, &edit, Some(&librarian))
            .await
            .expect("edit succeeds");

        assert_eq!(book.details().year().value(), 1966);
        assert_eq!(book.borrower(), Some(&librarian));
    }

    #[rstest]
    #[tokio::test]
    async fn empty_edit_writes_nothing(librarian: UserId) {
        let current = Book::new(BookId::random(), dune());
        let book_id = *current.id();

        let mut books = MockBookRepository::new();
        books
            .expect_find_by_id()
            .return_once(move |_| Ok(Some(current)));
        books.expect_update_details().times(0);

        let book = service(books, directory(librarian))
            .edit_book(&book_id, &BookEdit::default(), Some(&librarian))
            .await
            .expect("no-op edit succeeds");

        assert_eq!(book.details(), &dune());
    }

    #[rstest]
    #[tokio::test]
    async fn edit_of_missing_book_is_not_found(librarian: UserId) {
        let mut books = MockBookRepository::new();
        books.expect_find_by_id().return_once(|_| Ok(None));

        let error = service(books, directory(librarian))
            .edit_book(&BookId::random(), &BookEdit::default(), Some(&librarian))
            .await
            .expect_err("missing book");

        assert_eq!(error.code(), ErrorCode::NotFound);
    }

    #[rstest]
    #[case(true, None)]
    #[case(false, Some(ErrorCode::NotFound))]
    #[tokio::test]
    async fn remove_reports_missing_books(
        librarian: UserId,
        #[case] deleted: bool,
        #[case] expected: Option<ErrorCode>,
    ) {
        let mut books = MockBookRepository::new();
        books
            .expect_delete()
            .times(1)
            .return_once(move |_| Ok(deleted));

        let result = service(books, directory(librarian))
            .remove_book(&BookId::random(), Some(&librarian))
            .await;

        assert_eq!(result.err().map(|err| err.code()), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn connection_errors_are_service_unavailable(librarian: UserId) {
        let mut books = MockBookRepository::new();
        books
            .expect_delete()
            .return_once(|_| Err(BookRepositoryError::connection("refused")));

        let error = service(books, directory(librarian))
            .remove_book(&BookId::random(), Some(&librarian))
            .await
            .expect_err("connection failure");

        assert_eq!(error.code(), ErrorCode::ServiceUnavailable);
    }
}
