//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::biteship::BiteshipClient;
use crate::config::ServerConfig;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    biteship: BiteshipClient,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Server configuration
    /// * `pool` - `PostgreSQL` connection pool
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let biteship = BiteshipClient::new(&config.biteship);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                biteship,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the courier aggregator client.
    #[must_use]
    pub fn biteship(&self) -> &BiteshipClient {
        &self.inner.biteship
    }
}
