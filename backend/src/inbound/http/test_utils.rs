//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;

use crate::domain::{AccountService, CatalogueService, LendingService};
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::outbound::credentials::Argon2PasswordHasher;
use crate::outbound::memory::{InMemoryBookRepository, InMemoryUserRepository};

/// Session middleware with a fresh key per call and `Secure` disabled for
/// plain HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// HTTP state over fresh in-memory stores, with the stores exposed for
/// seeding and inspection.
pub struct InMemoryHarness {
    pub state: HttpState,
    pub books: Arc<InMemoryBookRepository>,
    pub users: Arc<InMemoryUserRepository>,
}

impl InMemoryHarness {
    pub fn new() -> Self {
        let books = Arc::new(InMemoryBookRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        let lending = Arc::new(LendingService::new(books.clone(), users.clone()));
        let accounts = Arc::new(AccountService::new(
            users.clone(),
            Arc::new(Argon2PasswordHasher::new()),
        ));
        let state = HttpState::new(HttpStatePorts {
            catalogue: lending.clone(),
            lending,
            catalogue_admin: Arc::new(CatalogueService::new(books.clone(), users.clone())),
            login: accounts.clone(),
            registration: accounts,
        });
        Self {
            state,
            books,
            users,
        }
    }
}
