mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::RETRY_AFTER};
use common::{lazy_pool, setup_test_app_with_rate_limit};
use http_body_util::BodyExt;
use kaayjang_config::RateLimitConfig;
use tower::ServiceExt;

/// Two requests per client per 15 minutes.
fn strict_rate_limit_config() -> RateLimitConfig {
    RateLimitConfig {
        enabled: true,
        max_requests: 2,
        window_secs: 900,
    }
}

fn request_from(uri: &str, ip: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("x-forwarded-for", ip)
        .body(Body::empty())
        .unwrap()
}

#[tokio::test]
async fn test_rate_limit_exceeded() {
    let app = setup_test_app_with_rate_limit(lazy_pool(), strict_rate_limit_config());

    // Rejected requests still consume the quota.
    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(request_from("/api/niveaux/%20", "192.168.1.100"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    let response = app
        .clone()
        .oneshot(request_from("/api/niveaux/%20", "192.168.1.100"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key(RETRY_AFTER));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "Too many requests, please try again later");
}

#[tokio::test]
async fn test_rate_limit_is_per_client() {
    let app = setup_test_app_with_rate_limit(lazy_pool(), strict_rate_limit_config());

    for _ in 0..3 {
        app.clone()
            .oneshot(request_from("/api/niveaux/%20", "10.0.0.1"))
            .await
            .unwrap();
    }

    let response = app
        .clone()
        .oneshot(request_from("/api/niveaux/%20", "10.0.0.2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_rate_limit_skips_non_api_routes() {
    let app = setup_test_app_with_rate_limit(lazy_pool(), strict_rate_limit_config());

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(request_from("/", "192.168.1.100"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
