//! # Kaayjang DB
//!
//! Database pool and utilities for the Kaayjang API.
//!
//! The pool is created once at startup, handed to every repository through
//! the application state, and closed after the server has drained.
//!
//! # Example
//!
//! ```ignore
//! use kaayjang_config::DatabaseConfig;
//! use kaayjang_db::{init_db_pool, run_migrations};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = init_db_pool(&DatabaseConfig::from_env()?).await?;
//!     run_migrations(&pool).await?;
//!     // serve requests...
//!     pool.close().await;
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use kaayjang_config::DatabaseConfig;
use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument};

// Re-export PgPool for convenience
pub use sqlx::PgPool;

/// Schema migrations embedded from the workspace `migrations/` directory.
pub static MIGRATOR: Migrator = sqlx::migrate!("../../migrations");

/// Opens a PostgreSQL connection pool.
///
/// # Errors
///
/// Returns the underlying `sqlx::Error` if no connection can be established
/// within the configured acquire timeout.
#[instrument(skip(config), fields(max_connections = config.max_connections))]
pub async fn init_db_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .connect(&config.url)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create database pool");
            e
        })?;

    info!(
        max_connections = config.max_connections,
        "Database connection pool initialized"
    );

    Ok(pool)
}

/// Applies pending migrations.
#[instrument(skip(pool))]
pub async fn run_migrations(pool: &PgPool) -> Result<(), MigrateError> {
    MIGRATOR.run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// `SELECT 1` round trip.
#[instrument(skip(pool))]
pub async fn health_check(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
