//! Rate limiting configuration for the `/api` routes.
//!
//! Each client IP gets a token bucket holding `max_requests` tokens that
//! refills completely over `window_secs`.
//!
//! # Configuration
//!
//! - `RATE_LIMIT_ENABLED`: `false` or `0` disables limiting (default: enabled)
//! - `RATE_LIMIT_MAX_REQUESTS`: Requests allowed per window (default: 100)
//! - `RATE_LIMIT_WINDOW_SECS`: Window length in seconds (default: 900)

use std::time::Duration;

use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub max_requests: u32,
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_requests: 100,
            window_secs: 15 * 60,
        }
    }
}

impl RateLimitConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            enabled: std::env::var("RATE_LIMIT_ENABLED")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.enabled),
            max_requests: env_or("RATE_LIMIT_MAX_REQUESTS", defaults.max_requests).max(1),
            window_secs: env_or("RATE_LIMIT_WINDOW_SECS", defaults.window_secs).max(1),
        }
    }

    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Time needed to regain a single request slot.
    #[must_use]
    pub fn replenish_interval(&self) -> Duration {
        let window = Duration::from_secs(self.window_secs.max(1));
        window / self.max_requests.max(1)
    }
}
