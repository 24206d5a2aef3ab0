//! Connection pool for the optional audit database.
//!
//! The tracker serves every request from memory; the pool only feeds the
//! best-effort trade/fill audit trail, so startup tolerates its absence.

use crate::config::DatabaseConfig;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;
use tracing::info;

/// Handle to the audit database pool.
#[derive(Clone)]
pub struct DatabasePool {
    pool: PgPool,
}

impl DatabasePool {
    /// Connects to the audit database using the configured pool limits.
    ///
    /// # Arguments
    /// * `database_url` - PostgreSQL connection string
    /// * `config` - pool sizing and acquire timeout
    ///
    /// # Errors
    /// Returns an error if the connection cannot be established.
    pub async fn new(database_url: &str, config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
            .connect(database_url)
            .await?;

        info!(
            "Audit database pool ready ({} connections max)",
            config.max_connections
        );

        Ok(Self { pool })
    }

    /// Returns a reference to the underlying pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Applies pending audit-schema migrations.
    ///
    /// # Errors
    /// Returns an error if migrations fail.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("Audit schema up to date");
        Ok(())
    }
}
