//! Book records and their catalogue value objects.
//!
//! A book is either on the shelf or lent to exactly one user. The pair
//! "borrowed flag + borrower reference" is modelled as [`LendingState`], so a
//! borrowed book without a borrower (or the reverse) cannot be represented.
//! Storage adapters that keep the pair as two columns go through
//! [`LendingState::from_columns`], which rejects inconsistent rows.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::UserId;

/// Maximum length, in characters, for titles and author names.
pub const BOOK_TEXT_MAX: usize = 256;
/// Earliest accepted publication year.
pub const YEAR_MIN: i32 = -9999;
/// Latest accepted publication year.
pub const YEAR_MAX: i32 = 9999;

/// Validation errors for book values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookValidationError {
    /// Book identifier was not a UUID.
    #[error("book id must be a valid UUID")]
    InvalidId,
    /// Title was blank.
    #[error("title must not be empty")]
    EmptyTitle,
    /// Title exceeded [`BOOK_TEXT_MAX`].
    #[error("title must be at most {max} characters")]
    TitleTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Author was blank.
    #[error("author must not be empty")]
    EmptyAuthor,
    /// Author exceeded [`BOOK_TEXT_MAX`].
    #[error("author must be at most {max} characters")]
    AuthorTooLong {
        /// Maximum accepted length.
        max: usize,
    },
    /// Publication year outside [`YEAR_MIN`]..=[`YEAR_MAX`].
    #[error("year must be between {min} and {max}")]
    YearOutOfRange {
        /// Earliest accepted year.
        min: i32,
        /// Latest accepted year.
        max: i32,
    },
    /// Stored borrowed flag and borrower reference disagree.
    #[error("borrowed flag and borrower reference are inconsistent")]
    InconsistentLending,
}

impl BookValidationError {
    /// Name of the offending input field, for adapter error details.
    pub fn field(&self) -> &'static str {
        match self {
            Self::InvalidId => "id",
            Self::EmptyTitle | Self::TitleTooLong { .. } => "title",
            Self::EmptyAuthor | Self::AuthorTooLong { .. } => "author",
            Self::YearOutOfRange { .. } => "year",
            Self::InconsistentLending => "borrower",
        }
    }
}

/// Unique book identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct BookId(Uuid);

impl BookId {
    /// Parse a [`BookId`] from its string form.
    pub fn new(id: impl AsRef<str>) -> Result<Self, BookValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| BookValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Generate a fresh identifier for a new catalogue entry.
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<BookId> for String {
    fn from(value: BookId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for BookId {
    type Error = BookValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

fn bounded_text(
    raw: &str,
    empty: BookValidationError,
    too_long: BookValidationError,
) -> Result<String, BookValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(empty);
    }
    if trimmed.chars().count() > BOOK_TEXT_MAX {
        return Err(too_long);
    }
    Ok(trimmed.to_owned())
}

/// Book title; unique across the catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Title(String);

impl Title {
    /// Trim and validate a title.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BookValidationError> {
        bounded_text(
            raw.as_ref(),
            BookValidationError::EmptyTitle,
            BookValidationError::TitleTooLong { max: BOOK_TEXT_MAX },
        )
        .map(Self)
    }
}

impl AsRef<str> for Title {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Author name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author(String);

impl Author {
    /// Trim and validate an author name.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, BookValidationError> {
        bounded_text(
            raw.as_ref(),
            BookValidationError::EmptyAuthor,
            BookValidationError::AuthorTooLong { max: BOOK_TEXT_MAX },
        )
        .map(Self)
    }
}

impl AsRef<str> for Author {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

/// Publication year. Negative values are years BCE.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublicationYear(i32);

impl PublicationYear {
    /// Validate a publication year.
    pub fn new(year: i32) -> Result<Self, BookValidationError> {
        if !(YEAR_MIN..=YEAR_MAX).contains(&year) {
            return Err(BookValidationError::YearOutOfRange {
                min: YEAR_MIN,
                max: YEAR_MAX,
            });
        }
        Ok(Self(year))
    }

    /// Numeric year.
    pub fn value(self) -> i32 {
        self.0
    }
}

/// Catalogue information about a book, independent of its lending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookDetails {
    title: Title,
    author: Author,
    year: PublicationYear,
}

impl BookDetails {
    /// Assemble details from validated parts.
    pub fn new(title: Title, author: Author, year: PublicationYear) -> Self {
        Self {
            title,
            author,
            year,
        }
    }

    /// Validate raw inputs into details.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::domain::BookDetails;
    ///
    /// let details = BookDetails::try_from_parts(" Dune ", "Frank Herbert", 1965).unwrap();
    /// assert_eq!(details.title().as_ref(), "Dune");
    /// ```
    pub fn try_from_parts(
        title: &str,
        author: &str,
        year: i32,
    ) -> Result<Self, BookValidationError> {
        Ok(Self::new(
            Title::new(title)?,
            Author::new(author)?,
            PublicationYear::new(year)?,
        ))
    }

    /// Book title.
    pub fn title(&self) -> &Title {
        &self.title
    }

    /// Author name.
    pub fn author(&self) -> &Author {
        &self.author
    }

    /// Publication year.
    pub fn year(&self) -> PublicationYear {
        self.year
    }
}

/// Lending state of a book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LendingState {
    /// On the shelf.
    #[default]
    Available,
    /// Lent to exactly one user.
    Borrowed {
        /// The current borrower.
        by: UserId,
    },
}

impl LendingState {
    /// Rebuild the state from separately stored flag and borrower columns.
    ///
    /// # Examples
    /// ```
    /// use bookshelf::domain::{LendingState, UserId};
    ///
    /// let reader = UserId::random();
    /// assert!(LendingState::from_columns(true, None).is_err());
    /// assert_eq!(
    ///     LendingState::from_columns(true, Some(reader)),
    ///     Ok(LendingState::Borrowed { by: reader })
    /// );
    /// ```
    pub fn from_columns(
        borrowed: bool,
        borrower: Option<UserId>,
    ) -> Result<Self, BookValidationError> {
        match (borrowed, borrower) {
            (false, None) => Ok(Self::Available),
            (true, Some(by)) => Ok(Self::Borrowed { by }),
            _ => Err(BookValidationError::InconsistentLending),
        }
    }

    /// Whether the book is currently lent out.
    pub fn is_borrowed(&self) -> bool {
        matches!(self, Self::Borrowed { .. })
    }

    /// Current borrower, if any.
    pub fn borrower(&self) -> Option<&UserId> {
        match self {
            Self::Available => None,
            Self::Borrowed { by } => Some(by),
        }
    }
}

/// A catalogue entry together with its lending state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    id: BookId,
    details: BookDetails,
    lending: LendingState,
}

impl Book {
    /// Create a new, available book.
    pub fn new(id: BookId, details: BookDetails) -> Self {
        Self {
            id,
            details,
            lending: LendingState::Available,
        }
    }

    /// Rebuild a book read back from storage.
    pub fn restore(id: BookId, details: BookDetails, lending: LendingState) -> Self {
        Self {
            id,
            details,
            lending,
        }
    }

    /// Book identifier.
    pub fn id(&self) -> &BookId {
        &self.id
    }

    /// Catalogue details.
    pub fn details(&self) -> &BookDetails {
        &self.details
    }

    /// Current lending state.
    pub fn lending(&self) -> &LendingState {
        &self.lending
    }

    /// Whether the book is lent out.
    pub fn is_borrowed(&self) -> bool {
        self.lending.is_borrowed()
    }

    /// Current borrower, if any.
    pub fn borrower(&self) -> Option<&UserId> {
        self.lending.borrower()
    }

    /// Same book with replaced catalogue details; lending state is untouched.
    pub fn with_details(&self, details: BookDetails) -> Self {
        Self {
            id: self.id,
            details,
            lending: self.lending,
        }
    }

    /// Same book in a new lending state. Only the lending state machine
    /// produces new states.
    pub(crate) fn with_lending(&self, lending: LendingState) -> Self {
        Self {
            id: self.id,
            details: self.details.clone(),
            lending,
        }
    }
}
