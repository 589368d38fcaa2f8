//! Account handlers: registration, login and logout.
//!
//! ```text
//! POST   /api/v1/register {"displayName":"Ada","email":"ada@example.com","password":"correct horse"}
//! POST   /api/v1/login    {"email":"ada@example.com","password":"correct horse"}
//! DELETE /api/v1/logout
//! ```
//!
//! Register and login are for anonymous callers only; a signed-in session is
//! sent back to the catalogue instead. A session whose account no longer
//! exists counts as anonymous and its stale identity is dropped.

use actix_web::http::header::LOCATION;
use actix_web::{HttpResponse, delete, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::domain::{
    CredentialsValidationError, Error, LoginCredentials, RegistrationDetails, UserValidationError,
    UserView,
};
use crate::inbound::http::schemas::ErrorSchema;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::{ApiResult, CATALOGUE_PATH, LOGIN_PATH};

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = CredentialsValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Registration request body for `POST /api/v1/register`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub display_name: String,
    pub email: String,
    pub password: String,
}

impl TryFrom<RegisterRequest> for RegistrationDetails {
    type Error = CredentialsValidationError;

    fn try_from(value: RegisterRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.display_name, &value.email, &value.password)
    }
}

/// Created account plus where the client should go next.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationResponse {
    pub user: UserView,
    pub redirect: String,
}

fn credentials_code(err: &CredentialsValidationError) -> &'static str {
    match err {
        CredentialsValidationError::Email(UserValidationError::EmptyEmail) => "empty_email",
        CredentialsValidationError::Email(_) => "invalid_email",
        CredentialsValidationError::DisplayName(UserValidationError::EmptyDisplayName) => {
            "empty_display_name"
        }
        CredentialsValidationError::DisplayName(_) => "invalid_display_name",
        CredentialsValidationError::EmptyPassword => "empty_password",
        CredentialsValidationError::PasswordTooShort { .. } => "password_too_short",
    }
}

fn map_credentials_error(err: &CredentialsValidationError) -> Error {
    Error::invalid_request(err.to_string())
        .with_details(json!({ "field": err.field(), "code": credentials_code(err) }))
}

fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((LOCATION, location))
        .finish()
}

/// Whether the session belongs to a live account. A stale identity is
/// forgotten so the caller can sign in again.
async fn signed_in(state: &HttpState, session: &SessionContext) -> Result<bool, Error> {
    let Some(user_id) = session.user_id()? else {
        return Ok(false);
    };
    if state.login.is_signed_in(&user_id).await? {
        return Ok(true);
    }
    session.forget_user();
    Ok(false)
}

/// Create an account.
#[utoipa::path(
    post,
    path = "/api/v1/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created; continue at login", body = RegistrationResponse),
        (status = 303, description = "Already signed in; redirect to the catalogue"),
        (status = 400, description = "Invalid registration details", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    if signed_in(&state, &session).await? {
        return Ok(see_other(CATALOGUE_PATH));
    }
    let details =
        RegistrationDetails::try_from(payload.into_inner()).map_err(|err| map_credentials_error(&err))?;
    let user = state.registration.register(&details).await?;
    Ok(HttpResponse::Created().json(RegistrationResponse {
        user,
        redirect: LOGIN_PATH.to_owned(),
    }))
}

/// Authenticate and establish a session.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 303, description = "Invalid credentials redirect back to login; signed-in sessions go to the catalogue", body = ErrorSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    if signed_in(&state, &session).await? {
        return Ok(see_other(CATALOGUE_PATH));
    }
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(|err| map_credentials_error(&err))?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(HttpResponse::Ok().finish())
}

/// End the session.
#[utoipa::path(
    delete,
    path = "/api/v1/logout",
    responses(
        (status = 303, description = "Session cleared; redirect to login")
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[delete("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    see_other(LOGIN_PATH)
}

#[cfg(test)]
mod tests;
