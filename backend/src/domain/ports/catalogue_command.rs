//! Driving port for catalogue upkeep: adding, editing and removing books.

use async_trait::async_trait;

use crate::domain::{
    Author, Book, BookDetails, BookId, BookValidationError, Error, PublicationYear, Title, UserId,
};

/// Partial edit of a book's catalogue details.
///
/// Absent or blank fields keep the book's current value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookEdit {
    title: Option<Title>,
    author: Option<Author>,
    year: Option<PublicationYear>,
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.filter(|value| !value.trim().is_empty())
}

impl BookEdit {
    /// Validate the supplied fields, skipping absent or blank ones.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::domain::ports::BookEdit;
    ///
    /// let edit = BookEdit::try_from_parts(Some("  "), Some("Frank Herbert"), None).unwrap();
    /// assert!(!edit.is_empty());
    /// ```
    pub fn try_from_parts(
        title: Option<&str>,
        author: Option<&str>,
        year: Option<i32>,
    ) -> Result<Self, BookValidationError> {
        Ok(Self {
            title: non_blank(title).map(Title::new).transpose()?,
            author: non_blank(author).map(Author::new).transpose()?,
            year: year.map(PublicationYear::new).transpose()?,
        })
    }

    /// Whether the edit changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.author.is_none() && self.year.is_none()
    }

    /// Merge the edit over `current`.
    pub fn apply(&self, current: &BookDetails) -> BookDetails {
        BookDetails::new(
            self.title.clone().unwrap_or_else(|| current.title().clone()),
            self.author
                .clone()
                .unwrap_or_else(|| current.author().clone()),
            self.year.unwrap_or_else(|| current.year()),
        )
    }
}

/// Catalogue upkeep use-cases. Callers must be signed in.
#[async_trait]
pub trait CatalogueCommand: Send + Sync {
    /// Add a new, available book.
    async fn add_book(&self, details: BookDetails, caller: Option<&UserId>)
    -> Result<Book, Error>;

    /// Edit a book's details.
    async fn edit_book(
        &self,
        book_id: &BookId,
        edit: &BookEdit,
        caller: Option<&UserId>,
    ) -> Result<Book, Error>;

    /// Remove a book from the catalogue.
    async fn remove_book(&self, book_id: &BookId, caller: Option<&UserId>) -> Result<(), Error>;
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn dune() -> BookDetails {
        BookDetails::try_from_parts("Dune", "Frank Herbert", 1965).expect("valid details")
    }

    #[rstest]
    fn empty_edit_keeps_everything(dune: BookDetails) {
        let edit = BookEdit::try_from_parts(None, Some(""), None).expect("blank is skipped");
        assert!(edit.is_empty());
        assert_eq!(edit.apply(&dune), dune);
    }

    #[rstest]
    fn partial_edit_overrides_supplied_fields(dune: BookDetails) {
        let edit = BookEdit::try_from_parts(Some(" Dune Messiah "), None, Some(1969))
            .expect("valid edit");

        let merged = edit.apply(&dune);

        assert_eq!(merged.title().as_ref(), "Dune Messiah");
        assert_eq!(merged.author().as_ref(), "Frank Herbert");
        assert_eq!(merged.year().value(), 1969);
    }

    #[rstest]
    fn invalid_supplied_field_is_rejected() {
        let err = BookEdit::try_from_parts(None, None, Some(12_345)).expect_err("year out of range");
        assert_eq!(err.field(), "year");
    }
}
