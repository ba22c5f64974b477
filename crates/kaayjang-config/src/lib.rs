//! # Kaayjang Config
//!
//! Configuration types for the Kaayjang API.
//!
//! This crate provides configuration structures loaded from environment variables:
//!
//! - [`server`]: Listening port and deployment environment
//! - [`database`]: PostgreSQL connection settings
//! - [`cors`]: CORS (Cross-Origin Resource Sharing) configuration
//! - [`rate_limit`]: Per-client request quota for `/api`
//!
//! # Example
//!
//! ```ignore
//! use kaayjang_config::{CorsConfig, DatabaseConfig, RateLimitConfig, ServerConfig};
//!
//! let server_config = ServerConfig::from_env();
//! let database_config = DatabaseConfig::from_env()?;
//! let cors_config = CorsConfig::from_env();
//! let rate_limit_config = RateLimitConfig::from_env();
//! ```

pub mod cors;
pub mod database;
pub mod rate_limit;
pub mod server;

// Re-export commonly used types at crate root
pub use cors::CorsConfig;
pub use database::{ConfigError, DatabaseConfig};
pub use rate_limit::RateLimitConfig;
pub use server::ServerConfig;

/// Reads `key` and parses it, falling back to `default` when the variable is
/// missing or malformed.
pub(crate) fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}
