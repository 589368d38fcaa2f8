//! Bookshelf lending backend.
//!
//! Hexagonal layout: [`domain`] holds the lending rules and ports,
//! [`inbound`] exposes them over HTTP and [`outbound`] implements storage
//! and credential hashing.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use domain::TraceId;
pub use middleware::Trace;
