//! HTTP inbound adapter exposing the JSON API under `/api/v1`.

pub mod books;
pub mod error;
pub mod health;
pub mod schemas;
pub mod session;
pub mod session_config;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod users;

pub use error::ApiResult;

/// Versioned API prefix.
pub const API_PREFIX: &str = "/api/v1";
/// Where unauthenticated callers are sent.
pub const LOGIN_PATH: &str = "/api/v1/login";
/// Where signed-in callers land after login or a repeated register/login.
pub const CATALOGUE_PATH: &str = "/api/v1/books";
