//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every HTTP endpoint of the inbound layer (books,
//! accounts, health) together with the request, response and error schemas,
//! and the session cookie security scheme. Swagger UI serves it in debug
//! builds; `cargo run --bin openapi-dump` prints it for external tooling.

use crate::domain::UserView;
use crate::domain::ports::CatalogueEntry;
use crate::inbound::http::books::{BookResponse, EditBookRequest, NewBookRequest};
use crate::inbound::http::schemas::{ErrorCodeSchema, ErrorSchema};
use crate::inbound::http::users::{LoginRequest, RegisterRequest, RegistrationResponse};
use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Bookshelf API",
        description = "Shared catalogue where signed-in readers borrow and return books."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::books::list_books,
        crate::inbound::http::books::add_book,
        crate::inbound::http::books::view_book,
        crate::inbound::http::books::edit_book,
        crate::inbound::http::books::remove_book,
        crate::inbound::http::books::borrow_book,
        crate::inbound::http::books::return_book,
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::logout,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        CatalogueEntry,
        UserView,
        BookResponse,
        NewBookRequest,
        EditBookRequest,
        LoginRequest,
        RegisterRequest,
        RegistrationResponse,
        ErrorSchema,
        ErrorCodeSchema
    )),
    tags(
        (name = "books", description = "Catalogue browsing, upkeep and lending"),
        (name = "users", description = "Registration and session management"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
