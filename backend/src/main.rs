//! Bookshelf entry-point: loads settings, prepares storage and runs the HTTP server.

mod server;

use actix_web::web;
use mockable::DefaultEnv;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use bookshelf::inbound::http::health::HealthState;
use bookshelf::inbound::http::session_config::{BuildMode, session_cookie_config_from_env};
use bookshelf::outbound::persistence::{DbPool, PoolConfig, run_migrations};
use ortho_config::OrthoConfig;
use server::{ServerConfig, ServerSettings, create_server};

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let settings = ServerSettings::load()
        .map_err(|err| std::io::Error::other(format!("failed to load settings: {err}")))?;

    let env = DefaultEnv::new();
    let cookies = session_cookie_config_from_env(&env, BuildMode::from_debug_assertions())
        .map_err(|err| std::io::Error::other(format!("invalid session configuration: {err}")))?;

    let config = ServerConfig::new(cookies, settings.session_ttl(), settings.bind_addr());
    let config = match settings.database_url() {
        Some(url) => config.with_db_pool(connect_database(url, &settings).await?),
        None => config,
    };
    #[cfg(feature = "metrics")]
    let config = config.with_metrics(Some(server::build_prometheus()?));

    let health_state = web::Data::new(HealthState::new());
    info!(bind_addr = %settings.bind_addr(), "starting bookshelf");
    let server = create_server(health_state, config)?;
    server.await
}

/// Apply migrations and open the connection pool.
async fn connect_database(url: &str, settings: &ServerSettings) -> std::io::Result<DbPool> {
    run_migrations(url)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))?;

    let pool_config = match settings.db_max_connections {
        Some(max) => PoolConfig::new(url).with_max_size(max),
        None => PoolConfig::new(url),
    };
    DbPool::new(pool_config)
        .await
        .map_err(|err| std::io::Error::other(err.to_string()))
}
