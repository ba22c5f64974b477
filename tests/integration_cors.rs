mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use common::lazy_pool;
use kaayjang::router::init_router;
use kaayjang::state::AppState;
use kaayjang_config::{CorsConfig, RateLimitConfig, ServerConfig};
use tower::ServiceExt;

fn app_with_cors(cors_config: CorsConfig) -> axum::Router {
    let state = AppState::new(
        lazy_pool(),
        ServerConfig::default(),
        cors_config,
        RateLimitConfig::disabled(),
    );
    init_router(state)
}

fn request_with_origin(origin: &str) -> Request<Body> {
    Request::builder()
        .uri("/")
        .header(header::ORIGIN, origin)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_wildcard_origin_mirrors_caller() {
    let app = app_with_cors(CorsConfig::parse("*"));

    let response = app
        .oneshot(request_with_origin("http://school.test"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://school.test"
    );
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_CREDENTIALS],
        "true"
    );
}

#[tokio::test]
async fn test_listed_origins_only() {
    let app = app_with_cors(CorsConfig::parse("http://a.test, http://b.test"));

    let response = app
        .clone()
        .oneshot(request_with_origin("http://b.test"))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://b.test"
    );

    let response = app
        .oneshot(request_with_origin("http://evil.test"))
        .await
        .unwrap();
    assert!(
        !response
            .headers()
            .contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN)
    );
}
