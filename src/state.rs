use kaayjang_config::{CorsConfig, RateLimitConfig, ServerConfig};
use sqlx::PgPool;

use crate::modules::classes::service::ClassService;
use crate::modules::levels::service::LevelService;
use crate::modules::students::service::StudentService;
use crate::modules::tracks::service::TrackService;

/// Shared by every handler. Services are cheap handles over the same pool.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: PgPool,
    pub server_config: ServerConfig,
    pub cors_config: CorsConfig,
    pub rate_limit_config: RateLimitConfig,
    pub levels: LevelService,
    pub tracks: TrackService,
    pub classes: ClassService,
    pub students: StudentService,
}

impl AppState {
    pub fn new(
        db: PgPool,
        server_config: ServerConfig,
        cors_config: CorsConfig,
        rate_limit_config: RateLimitConfig,
    ) -> Self {
        Self {
            levels: LevelService::new(db.clone()),
            tracks: TrackService::new(db.clone()),
            classes: ClassService::new(db.clone()),
            students: StudentService::new(db.clone()),
            db,
            server_config,
            cors_config,
            rate_limit_config,
        }
    }

    /// State with configuration read from the environment.
    pub fn from_env(db: PgPool) -> Self {
        Self::new(
            db,
            ServerConfig::from_env(),
            CorsConfig::from_env(),
            RateLimitConfig::from_env(),
        )
    }
}
