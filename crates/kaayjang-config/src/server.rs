use crate::env_or;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    /// `development`, `production`, or anything else the deployment uses.
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads `PORT` (default 3000) and `APP_ENV` (default `development`).
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            port: env_or("PORT", defaults.port),
            environment: std::env::var("APP_ENV").unwrap_or(defaults.environment),
        }
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_development_on_3000() {
        let config = ServerConfig::default();
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.bind_address(), "0.0.0.0:3000");
    }
}
