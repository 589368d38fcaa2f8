//! Driving port for borrowing and returning books.

use async_trait::async_trait;

use crate::domain::{BookId, Error, UserId};

use super::CatalogueEntry;

/// Lending use-cases. The caller is passed explicitly; `None` means the
/// request carried no session.
#[async_trait]
pub trait LendingCommand: Send + Sync {
    /// Lend the book to the caller.
    async fn borrow(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error>;

    /// Hand the book back on behalf of the caller (`returnBook`).
    async fn return_book(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error>;
}
