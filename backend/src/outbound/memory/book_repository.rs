//! In-memory `BookRepository`.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{BookRepository, BookRepositoryError};
use crate::domain::{Book, BookDetails, BookId, LendingState};

/// Book store held in process memory.
#[derive(Debug, Default)]
pub struct InMemoryBookRepository {
    books: Mutex<HashMap<BookId, Book>>,
}

impl InMemoryBookRepository {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<BookId, Book>>, BookRepositoryError> {
        self.books
            .lock()
            .map_err(|_| BookRepositoryError::query("book store lock poisoned"))
    }
}

fn title_taken(books: &HashMap<BookId, Book>, title: &str, except: Option<&BookId>) -> bool {
    books
        .values()
        .any(|book| Some(book.id()) != except && book.details().title().as_ref() == title)
}

#[async_trait]
impl BookRepository for InMemoryBookRepository {
    async fn find_by_id(&self, id: &BookId) -> Result<Option<Book>, BookRepositoryError> {
        Ok(self.lock()?.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Book>, BookRepositoryError> {
        let mut books: Vec<Book> = self.lock()?.values().cloned().collect();
        books.sort_by(|a, b| {
            a.details()
                .title()
                .as_ref()
                .cmp(b.details().title().as_ref())
                .then_with(|| a.id().as_uuid().cmp(b.id().as_uuid()))
        });
        Ok(books)
    }

    async fn insert(&self, book: &Book) -> Result<(), BookRepositoryError> {
        let mut books = self.lock()?;
        let title = book.details().title().as_ref();
        if title_taken(&books, title, None) {
            return Err(BookRepositoryError::duplicate_title(title));
        }
        if books.contains_key(book.id()) {
            return Err(BookRepositoryError::query(format!(
                "book {} already exists",
                book.id()
            )));
        }
        books.insert(*book.id(), book.clone());
        Ok(())
    }

    async fn update_details(
        &self,
        id: &BookId,
        details: &BookDetails,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut books = self.lock()?;
        let title = details.title().as_ref();
        if title_taken(&books, title, Some(id)) {
            return Err(BookRepositoryError::duplicate_title(title));
        }
        let Some(stored) = books.get_mut(id) else {
            return Ok(None);
        };
        *stored = stored.with_details(details.clone());
        Ok(Some(stored.clone()))
    }

    async fn update_lending_state(
        &self,
        id: &BookId,
        expected: &LendingState,
        next: &LendingState,
    ) -> Result<Option<Book>, BookRepositoryError> {
        let mut books = self.lock()?;
        let Some(stored) = books.get_mut(id) else {
            return Ok(None);
        };
        if stored.lending() != expected {
            return Ok(None);
        }
        *stored = stored.with_lending(*next);
        Ok(Some(stored.clone()))
    }

    async fn delete(&self, id: &BookId) -> Result<bool, BookRepositoryError> {
        Ok(self.lock()?.remove(id).is_some())
    }
}
