use crate::docs::ApiDoc;
use crate::logging::{REQUEST_ID_HEADER, logging_middleware};
use crate::metrics::{init_metrics_router, metrics_middleware};
use crate::middleware::rate_limit::{ApiRateLimiter, rate_limit_middleware};
use crate::modules::classes::init_classes_router;
use crate::modules::health::{init_health_router, welcome};
use crate::modules::levels::init_levels_router;
use crate::modules::students::init_students_router;
use crate::modules::tracks::init_tracks_router;
use crate::state::AppState;
use anyhow::anyhow;
use axum::http::{HeaderName, HeaderValue, Method, Uri};
use axum::routing::get;
use axum::{Router, middleware};
use kaayjang_core::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{AllowOrigin, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable as _};
use utoipa_swagger_ui::SwaggerUi;

async fn route_not_found(uri: Uri) -> AppError {
    let path = uri
        .path_and_query()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());
    AppError::not_found(anyhow!("Route {} not found", path))
}

/// A `*` origin mirrors the caller's origin, since a literal wildcard cannot
/// be combined with credentials.
fn cors_layer(state: &AppState) -> CorsLayer {
    let allow_origin = if state.cors_config.allows_any_origin() {
        AllowOrigin::mirror_request()
    } else {
        let origins: Vec<HeaderValue> = state
            .cors_config
            .allowed_origins
            .iter()
            .filter_map(|origin| origin.parse().ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            axum::http::header::AUTHORIZATION,
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
        .allow_credentials(true)
}

fn api_router(state: &AppState) -> Router<AppState> {
    let api = Router::new()
        .nest("/niveaux", init_levels_router())
        .nest("/filieres", init_tracks_router())
        .nest("/classes", init_classes_router())
        .nest("/etudiants", init_students_router())
        .nest("/health", init_health_router());

    match ApiRateLimiter::from_config(&state.rate_limit_config) {
        Some(limiter) => {
            limiter.spawn_pruning();
            api.layer(middleware::from_fn_with_state(
                limiter,
                rate_limit_middleware,
            ))
        }
        None => api,
    }
}

/// The full application. `metrics` adds `GET /metrics` when present.
pub fn init_router_with_metrics(state: AppState, metrics: Option<PrometheusHandle>) -> Router {
    let mut router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(Scalar::with_url("/scalar", ApiDoc::openapi()))
        .route("/", get(welcome))
        .nest("/api", api_router(&state));

    if let Some(handle) = metrics {
        router = router.merge(init_metrics_router(handle));
    }

    router
        .fallback(route_not_found)
        .with_state(state.clone())
        .layer(cors_layer(&state))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(logging_middleware))
}

pub fn init_router(state: AppState) -> Router {
    init_router_with_metrics(state, None)
}
