//! Book catalogue and lending handlers.
//!
//! ```text
//! GET    /api/v1/books
//! POST   /api/v1/books {"title":"Dune","author":"Frank Herbert","year":1965}
//! GET    /api/v1/books/{id}
//! PUT    /api/v1/books/{id} {"author":"F. Herbert"}
//! DELETE /api/v1/books/{id}
//! POST   /api/v1/books/{id}/borrow
//! POST   /api/v1/books/{id}/return
//! ```
//!
//! Every route requires a signed-in caller. Anonymous requests are redirected
//! to login before their input is validated. Request bodies are taken as raw
//! bytes and decoded only once the caller is known, so a malformed body from
//! an anonymous caller is also a redirect.

use actix_web::{HttpResponse, delete, get, post, put, web};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::ports::{BookEdit, CatalogueEntry};
use crate::domain::{Book, BookDetails, BookId, BookValidationError, Error, LendingError, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// New book body for `POST /api/v1/books`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewBookRequest {
    pub title: String,
    pub author: String,
    pub year: i32,
}

/// Edit body for `PUT /api/v1/books/{id}`. Absent or blank fields keep
/// their current value.
#[derive(Debug, Default, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditBookRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub year: Option<i32>,
}

/// Stored book as returned by the upkeep endpoints.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    #[schema(format = Uuid)]
    pub id: String,
    pub title: String,
    pub author: String,
    pub year: i32,
    pub is_borrowed: bool,
    #[schema(format = Uuid)]
    pub borrower_id: Option<String>,
}

impl From<&Book> for BookResponse {
    fn from(book: &Book) -> Self {
        let details = book.details();
        Self {
            id: book.id().to_string(),
            title: details.title().as_ref().to_owned(),
            author: details.author().as_ref().to_owned(),
            year: details.year().value(),
            is_borrowed: book.is_borrowed(),
            borrower_id: book.borrower().map(ToString::to_string),
        }
    }
}

fn validation_code(err: &BookValidationError) -> &'static str {
    match err {
        BookValidationError::InvalidId => "invalid_id",
        BookValidationError::EmptyTitle => "empty_title",
        BookValidationError::TitleTooLong { .. } => "title_too_long",
        BookValidationError::EmptyAuthor => "empty_author",
        BookValidationError::AuthorTooLong { .. } => "author_too_long",
        BookValidationError::YearOutOfRange { .. } => "year_out_of_range",
        BookValidationError::InconsistentLending => "inconsistent_lending",
    }
}

/// Anonymous callers get the login redirect instead of a validation error.
fn reject_input(caller: Option<&UserId>, err: &BookValidationError) -> Error {
    if caller.is_none() {
        return LendingError::Unauthenticated.into();
    }
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": validation_code(err) }))
}

fn decode_body<T: DeserializeOwned>(body: &[u8], caller: Option<&UserId>) -> Result<T, Error> {
    serde_json::from_slice(body).map_err(|err| {
        if caller.is_none() {
            return LendingError::Unauthenticated.into();
        }
        Error::invalid_request(format!("invalid request body: {err}"))
            .with_details(json!({ "code": "invalid_body" }))
    })
}

fn parse_book_id(raw: &str, caller: Option<&UserId>) -> Result<BookId, Error> {
    BookId::new(raw).map_err(|err| reject_input(caller, &err))
}

/// List the catalogue with borrowers resolved (`listCatalog`).
#[utoipa::path(
    get,
    path = "/api/v1/books",
    responses(
        (status = 200, description = "Catalogue", body = [CatalogueEntry]),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "listCatalogue"
)]
#[get("/books")]
pub async fn list_books(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<web::Json<Vec<CatalogueEntry>>> {
    let caller = session.user_id()?;
    let entries = state.catalogue.list_catalogue(caller.as_ref()).await?;
    Ok(web::Json(entries))
}

/// Add a book to the catalogue.
#[utoipa::path(
    post,
    path = "/api/v1/books",
    request_body = NewBookRequest,
    responses(
        (status = 201, description = "Book added", body = BookResponse),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 400, description = "Invalid book details", body = ErrorSchema),
        (status = 409, description = "Title already catalogued", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "addBook"
)]
#[post("/books")]
pub async fn add_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let caller = session.user_id()?;
    let NewBookRequest {
        title,
        author,
        year,
    } = decode_body(&body, caller.as_ref())?;
    let details = BookDetails::try_from_parts(&title, &author, year)
        .map_err(|err| reject_input(caller.as_ref(), &err))?;
    let book = state
        .catalogue_admin
        .add_book(details, caller.as_ref())
        .await?;
    Ok(HttpResponse::Created().json(BookResponse::from(&book)))
}

/// View one book.
#[utoipa::path(
    get,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book", body = CatalogueEntry),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "viewBook"
)]
#[get("/books/{id}")]
pub async fn view_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CatalogueEntry>> {
    let caller = session.user_id()?;
    let book_id = parse_book_id(&path, caller.as_ref())?;
    let entry = state.catalogue.view_book(&book_id, caller.as_ref()).await?;
    Ok(web::Json(entry))
}

/// Edit a book's details.
#[utoipa::path(
    put,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    request_body = EditBookRequest,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 400, description = "Invalid book details", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Title already catalogued", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "editBook"
)]
#[put("/books/{id}")]
pub async fn edit_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    body: web::Bytes,
) -> ApiResult<web::Json<BookResponse>> {
    let caller = session.user_id()?;
    let book_id = parse_book_id(&path, caller.as_ref())?;
    let EditBookRequest {
        title,
        author,
        year,
    } = decode_body(&body, caller.as_ref())?;
    let edit = BookEdit::try_from_parts(title.as_deref(), author.as_deref(), year)
        .map_err(|err| reject_input(caller.as_ref(), &err))?;
    let book = state
        .catalogue_admin
        .edit_book(&book_id, &edit, caller.as_ref())
        .await?;
    Ok(web::Json(BookResponse::from(&book)))
}

/// Remove a book from the catalogue.
#[utoipa::path(
    delete,
    path = "/api/v1/books/{id}",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 204, description = "Book removed"),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema)
    ),
    tags = ["books"],
    operation_id = "removeBook"
)]
#[delete("/books/{id}")]
pub async fn remove_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let caller = session.user_id()?;
    let book_id = parse_book_id(&path, caller.as_ref())?;
    state
        .catalogue_admin
        .remove_book(&book_id, caller.as_ref())
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Borrow a book.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/borrow",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book borrowed by the caller", body = CatalogueEntry),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Already borrowed or lost a concurrent update", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["lending"],
    operation_id = "borrowBook"
)]
#[post("/books/{id}/borrow")]
pub async fn borrow_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CatalogueEntry>> {
    let caller = session.user_id()?;
    let book_id = parse_book_id(&path, caller.as_ref())?;
    let entry = state.lending.borrow(&book_id, caller.as_ref()).await?;
    Ok(web::Json(entry))
}

/// Return a borrowed book.
#[utoipa::path(
    post,
    path = "/api/v1/books/{id}/return",
    params(("id" = String, Path, description = "Book identifier")),
    responses(
        (status = 200, description = "Book back on the shelf", body = CatalogueEntry),
        (status = 303, description = "Not signed in; redirect to login", body = ErrorSchema),
        (status = 403, description = "Borrowed by someone else", body = ErrorSchema),
        (status = 404, description = "No such book", body = ErrorSchema),
        (status = 409, description = "Not borrowed or lost a concurrent update", body = ErrorSchema),
        (status = 503, description = "Storage unavailable", body = ErrorSchema)
    ),
    tags = ["lending"],
    operation_id = "returnBook"
)]
#[post("/books/{id}/return")]
pub async fn return_book(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<web::Json<CatalogueEntry>> {
    let caller = session.user_id()?;
    let book_id = parse_book_id(&path, caller.as_ref())?;
    let entry = state.lending.return_book(&book_id, caller.as_ref()).await?;
    Ok(web::Json(entry))
}
