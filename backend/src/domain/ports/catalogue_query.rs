//! Driving port for reading the catalogue.

use async_trait::async_trait;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::{Book, BookId, Error, UserId, UserView};

/// One catalogue row as presented to a signed-in caller.
///
/// The borrower view is resolved through the user directory when the entry
/// is built; the lending decision itself only compares raw ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CatalogueEntry {
    #[schema(value_type = String, format = Uuid)]
    id: BookId,
    title: String,
    author: String,
    year: i32,
    is_borrowed: bool,
    borrower: Option<UserView>,
    borrowed_by_caller: bool,
}

impl CatalogueEntry {
    /// Present `book` to `caller`, with the borrower already resolved.
    pub fn present(book: &Book, borrower: Option<UserView>, caller: &UserId) -> Self {
        let details = book.details();
        Self {
            id: *book.id(),
            title: details.title().as_ref().to_owned(),
            author: details.author().as_ref().to_owned(),
            year: details.year().value(),
            is_borrowed: book.is_borrowed(),
            borrower,
            borrowed_by_caller: book.borrower() == Some(caller),
        }
    }

    /// Book identifier.
    pub fn id(&self) -> &BookId {
        &self.id
    }

    /// Book title.
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Whether the book is lent out.
    pub fn is_borrowed(&self) -> bool {
        self.is_borrowed
    }

    /// Current borrower, when lent out and known to the directory.
    pub fn borrower(&self) -> Option<&UserView> {
        self.borrower.as_ref()
    }

    /// Whether the caller is the current borrower.
    pub fn borrowed_by_caller(&self) -> bool {
        self.borrowed_by_caller
    }
}

/// Read side of the catalogue. Callers must be signed in.
#[async_trait]
pub trait CatalogueQuery: Send + Sync {
    /// Every book with its borrower resolved (`listCatalog`).
    async fn list_catalogue(&self, caller: Option<&UserId>) -> Result<Vec<CatalogueEntry>, Error>;

    /// One book with its borrower resolved.
    async fn view_book(
        &self,
        book_id: &BookId,
        caller: Option<&UserId>,
    ) -> Result<CatalogueEntry, Error>;
}
