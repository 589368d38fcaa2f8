//! Shared HTTP adapter state.
//!
//! Handlers receive this through `web::Data` and only see the driving ports,
//! so they stay testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    CatalogueCommand, CatalogueQuery, LendingCommand, LoginService, RegistrationService,
};

/// Port implementations bundled for construction.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub lending: Arc<dyn LendingCommand>,
    pub catalogue_admin: Arc<dyn CatalogueCommand>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalogue: Arc<dyn CatalogueQuery>,
    pub lending: Arc<dyn LendingCommand>,
    pub catalogue_admin: Arc<dyn CatalogueCommand>,
    pub login: Arc<dyn LoginService>,
    pub registration: Arc<dyn RegistrationService>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use bookshelf::domain::{AccountService, CatalogueService, LendingService};
    /// use bookshelf::inbound::http::state::{HttpState, HttpStatePorts};
    /// use bookshelf::outbound::credentials::Argon2PasswordHasher;
    /// use bookshelf::outbound::memory::{InMemoryBookRepository, InMemoryUserRepository};
    ///
    /// let books = Arc::new(InMemoryBookRepository::new());
    /// let users = Arc::new(InMemoryUserRepository::new());
    /// let lending = Arc::new(LendingService::new(books.clone(), users.clone()));
    /// let accounts = Arc::new(AccountService::new(users.clone(), Arc::new(Argon2PasswordHasher::new())));
    /// let state = HttpState::new(HttpStatePorts {
    ///     catalogue: lending.clone(),
    ///     lending,
    ///     catalogue_admin: Arc::new(CatalogueService::new(books, users)),
    ///     login: accounts.clone(),
    ///     registration: accounts,
    /// });
    /// let _login = state.login.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            catalogue,
            lending,
            catalogue_admin,
            login,
            registration,
        } = ports;
        Self {
            catalogue,
            lending,
            catalogue_admin,
            login,
            registration,
        }
    }
}
