//! Lending and catalogue read services.
//!
//! [`LendingService`] runs every borrow or return as load, decide, write:
//!
//! 1. the [`AuthorizationGate`] admits the caller (no book is loaded otherwise);
//! 2. the book is loaded fresh and handed to the pure state machine in
//!    [`crate::domain::lending`];
//! 3. an approved transition is persisted with one conditional update that
//!    only lands if the stored lending state is still the one just inspected.
//!
//! A conditional update that matches nothing fails the request with
//! [`LendingError::ConcurrentModification`]; it is not retried.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::domain::authorization::{AuthenticatedCaller, AuthorizationGate};
use crate::domain::ports::{
    BookRepository, BookRepositoryError, CatalogueEntry, CatalogueQuery, LendingCommand,
    UserRepository,
};
use crate::domain::{lending, Book, BookId, Error, LendingError, UserId, UserView};

fn load_error(error: BookRepositoryError) -> LendingError {
    LendingError::StoreUnavailable(error.to_string())
}

fn write_error(error: BookRepositoryError) -> LendingError {
    LendingError::WriteError(error.to_string())
}

/// Service implementing [`LendingCommand`] and [`CatalogueQuery`].
pub struct LendingService<B: ?Sized, U: ?Sized> {
    books: Arc<B>,
    users: Arc<U>,
    gate: AuthorizationGate<U>,
}

impl<B: ?Sized, U: ?Sized> Clone for LendingService<B, U> {
    fn clone(&self) -> Self {
        Self {
            books: Arc::clone(&self.books),
            users: Arc::clone(&self.users),
            gate: self.gate.clone(),
        }
    }
}

impl<B, U> LendingService<B, U>
where
    B: BookRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    /// Create the service over a book store and user directory.
    pub fn new(books: Arc<B>, users: Arc<U>) -> Self {
        let gate = AuthorizationGate::new(Arc::clone(&users));
        Self { books, users, gate }
    }

    async fn load(&self, book_id: &BookId) -> Result<Book, LendingError> {
        self.books
            .find_by_id(book_id)
            .await
            .map_err(load_error)?
            .ok_or(LendingError::NotFound(*book_id))
    }

    async fn transition(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
        action: &'static str,
        decide: fn(&Book, &UserId) -> Result<Book, LendingError>,
    ) -> Result<(Book, AuthenticatedCaller), LendingError> {
        let caller = self.gate.admit(caller).await?;
        let current = self.load(book_id).await?;

        let next = decide(&current, caller.id()).inspect_err(|err| {
            warn!(book_id = %book_id, user_id = %caller.id(), action, reason = %err, "lending transition rejected");
        })?;

        let written = self
            .books
            .update_lending_state(book_id, current.lending(), next.lending())
            .await
            .map_err(write_error)?
            .ok_or_else(|| {
                warn!(book_id = %book_id, user_id = %caller.id(), action, "book changed before write");
                LendingError::ConcurrentModification
            })?;

        info!(book_id = %book_id, user_id = %caller.id(), action, "lending transition applied");
        Ok((written, caller))
    }

    async fn resolve_borrowers(
        &self,
        books: &[Book],
    ) -> Result<HashMap<UserId, UserView>, LendingError> {
        let mut ids: Vec<UserId> = books.iter().filter_map(Book::borrower).copied().collect();
        ids.sort_unstable_by_key(|id| *id.as_uuid());
        ids.dedup();
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let users = self
            .users
            .find_by_ids(&ids)
            .await
            .map_err(|err| LendingError::StoreUnavailable(err.to_string()))?;
        Ok(users
            .into_iter()
            .map(|user| (*user.id(), user.view()))
            .collect())
    }

    async fn present_one(&self, book: &Book, caller: &UserId) -> Result<CatalogueEntry, LendingError> {
        let mut borrowers = self.resolve_borrowers(std::slice::from_ref(book)).await?;
        let borrower = book.borrower().and_then(|id| borrowers.remove(id));
        Ok(CatalogueEntry::present(book, borrower, caller))
    }
}

#[async_trait]
impl<B, U> LendingCommand for LendingService<B, U>
where
    B: BookRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn borrow(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error> {
        let (book, caller) = self
            .transition(book_id, caller, "borrow", lending::borrow)
            .await?;
        Ok(CatalogueEntry::present(
            &book,
            Some(caller.view().clone()),
            caller.id(),
        ))
    }

    async fn return_book(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error> {
        let (book, caller) = self
            .transition(book_id, caller, "return", lending::return_book)
            .await?;
        Ok(CatalogueEntry::present(&book, None, caller.id()))
    }
}

#[async_trait]
impl<B, U> CatalogueQuery for LendingService<B, U>
where
    B: BookRepository + ?Sized,
    U: UserRepository + ?Sized,
{
    async fn list_catalogue(&self, caller: Option<&UserId>) -> Result<Vec<CatalogueEntry>, Error> {
        let caller = self.gate.admit(caller).await?;
        let books = self.books.list().await.map_err(load_error)?;
        let borrowers = self.resolve_borrowers(&books).await?;

        Ok(books
            .iter()
            .map(|book| {
                let borrower = book.borrower().and_then(|id| borrowers.get(id)).cloned();
                CatalogueEntry::present(book, borrower, caller.id())
            })
            .collect())
    }

    async fn view_book(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error> {
        let caller = self.gate.admit(caller).await?;
        let book = self.load(book_id).await?;
        Ok(self.present_one(&book, caller.id()).await?)
    }
}

#[cfg(test)]
#[path = "lending_service_tests.rs"]
mod tests;
