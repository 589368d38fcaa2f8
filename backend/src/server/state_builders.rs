//! Builders wiring storage adapters into the HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::{info, warn};

use bookshelf::domain::ports::{BookRepository, UserRepository};
use bookshelf::domain::{AccountService, CatalogueService, LendingService};
use bookshelf::inbound::http::state::{HttpState, HttpStatePorts};
use bookshelf::outbound::credentials::Argon2PasswordHasher;
use bookshelf::outbound::memory::{InMemoryBookRepository, InMemoryUserRepository};
use bookshelf::outbound::persistence::{DieselBookRepository, DieselUserRepository};

use super::ServerConfig;

/// Build every driving port over one book store and one user directory.
fn build_ports<B, U>(books: Arc<B>, users: Arc<U>) -> HttpStatePorts
where
    B: BookRepository + 'static,
    U: UserRepository + 'static,
{
    let lending = Arc::new(LendingService::new(Arc::clone(&books), Arc::clone(&users)));
    let accounts = Arc::new(AccountService::new(
        Arc::clone(&users),
        Arc::new(Argon2PasswordHasher::new()),
    ));
    HttpStatePorts {
        catalogue: lending.clone(),
        lending,
        catalogue_admin: Arc::new(CatalogueService::new(books, users)),
        login: accounts.clone(),
        registration: accounts,
    }
}

/// Build the shared HTTP state, using PostgreSQL when a pool is configured
/// and in-memory stores otherwise.
pub(super) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.db_pool {
        Some(pool) => {
            info!("storing books and accounts in PostgreSQL");
            build_ports(
                Arc::new(DieselBookRepository::new(pool.clone())),
                Arc::new(DieselUserRepository::new(pool.clone())),
            )
        }
        None => {
            warn!("no database configured; books and accounts live in memory only");
            build_ports(
                Arc::new(InMemoryBookRepository::new()),
                Arc::new(InMemoryUserRepository::new()),
            )
        }
    };
    web::Data::new(HttpState::new(ports))
}
