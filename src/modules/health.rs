//! Liveness and welcome endpoints.

use axum::{Router, extract::State, routing::get};
use chrono::{DateTime, Utc};
use kaayjang_core::ApiResponse;
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: &'static str,
    /// `up` when a trivial query succeeds.
    pub database: &'static str,
    pub timestamp: DateTime<Utc>,
    pub version: &'static str,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Welcome {
    pub name: &'static str,
    pub version: &'static str,
    pub docs: &'static str,
    pub health: &'static str,
}

#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "The API is up", body = HealthStatus)),
    tag = "Health"
)]
pub async fn health(State(state): State<AppState>) -> ApiResponse<HealthStatus> {
    let database_up = match kaayjang_db::health_check(&state.db).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Database health check failed");
            false
        }
    };

    ApiResponse::ok(
        HealthStatus {
            status: if database_up { "ok" } else { "degraded" },
            database: if database_up { "up" } else { "down" },
            timestamp: Utc::now(),
            version: env!("CARGO_PKG_VERSION"),
        },
        "API is running",
    )
}

#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Welcome message", body = Welcome)),
    tag = "Health"
)]
pub async fn welcome() -> ApiResponse<Welcome> {
    ApiResponse::ok(
        Welcome {
            name: "Kaayjang API",
            version: env!("CARGO_PKG_VERSION"),
            docs: "/swagger-ui",
            health: "/api/health",
        },
        "Welcome to the Kaayjang school management API",
    )
}

pub fn init_health_router() -> Router<AppState> {
    Router::new().route("/", get(health))
}
