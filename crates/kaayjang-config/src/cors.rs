use std::env;

#[derive(Clone, Debug)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl CorsConfig {
    /// Reads `CORS_ORIGIN`, a comma separated list of allowed origins.
    pub fn from_env() -> Self {
        match env::var("CORS_ORIGIN") {
            Ok(raw) => Self::parse(&raw),
            Err(_) => Self::default(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        let allowed_origins: Vec<String> = raw
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if allowed_origins.is_empty() {
            return Self::default();
        }

        Self { allowed_origins }
    }

    /// True when `*` appears among the origins.
    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}
