//! HTTP server configuration object.

use actix_web::cookie::time::Duration;
use actix_web::cookie::{Key, SameSite};
use bookshelf::inbound::http::session_config::SessionCookieConfig;
use bookshelf::outbound::persistence::DbPool;
use std::net::SocketAddr;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

/// Everything [`super::create_server`] needs to start listening.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) session_ttl: Duration,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Build a configuration from validated cookie settings.
    #[must_use]
    pub fn new(cookies: SessionCookieConfig, session_ttl: Duration, bind_addr: SocketAddr) -> Self {
        let SessionCookieConfig {
            key,
            cookie_secure,
            same_site,
        } = cookies;
        Self {
            key,
            cookie_secure,
            same_site,
            session_ttl,
            bind_addr,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Store books and users in PostgreSQL through `pool`.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
