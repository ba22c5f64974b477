use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::{Duration, Instant};

static OBSERVABILITY_ENABLED: OnceLock<bool> = OnceLock::new();

/// Reads `OBSERVABILITY_ENABLED` once; anything but `false`/`0` enables it.
pub fn is_observability_enabled() -> bool {
    *OBSERVABILITY_ENABLED.get_or_init(|| {
        std::env::var("OBSERVABILITY_ENABLED")
            .map(|v| v.to_lowercase() != "false" && v != "0")
            .unwrap_or(true)
    })
}

const LATENCY_BUCKETS: &[f64] = &[
    0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0,
];

/// Installs the Prometheus recorder and spawns its upkeep task.
///
/// Returns `Ok(None)` when observability is disabled.
pub fn init_metrics() -> Result<Option<PrometheusHandle>, BuildError> {
    if !is_observability_enabled() {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            LATENCY_BUCKETS,
        )?
        .install_recorder()?;

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

/// Holds one slot of `http_requests_active` until dropped, so cancelled
/// requests are released too.
struct InFlight;

impl InFlight {
    fn enter() -> Self {
        gauge!("http_requests_active").increment(1.0);
        InFlight
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        gauge!("http_requests_active").decrement(1.0);
    }
}

fn status_class(status: u16) -> &'static str {
    match status {
        200..=299 => "2xx",
        300..=399 => "3xx",
        400..=499 => "4xx",
        500..=599 => "5xx",
        _ => "other",
    }
}

/// Records request count, latency and in-flight gauge per matched route.
pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_observability_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => "unmatched".to_owned(),
    };

    let _in_flight = InFlight::enter();
    let response = next.run(req).await;

    let status = response.status().as_u16();
    counter!(
        "http_requests_total",
        "method" => method.clone(),
        "path" => path.clone(),
        "status" => status.to_string()
    )
    .increment(1);
    counter!("http_requests_by_status", "status_category" => status_class(status)).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path)
        .record(start.elapsed().as_secs_f64());

    response
}

/// `GET /metrics` in the Prometheus text format.
pub fn init_metrics_router<S: Clone + Send + Sync + 'static>(handle: PrometheusHandle) -> Router<S> {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

/// Counts a created level, track, class or student.
pub fn track_entity_created(entity: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("entities_created_total", "entity" => entity).increment(1);
}

pub fn track_entity_deleted(entity: &'static str) {
    if !is_observability_enabled() {
        return;
    }
    counter!("entities_deleted_total", "entity" => entity).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_buckets_are_sorted() {
        assert!(LATENCY_BUCKETS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_status_class() {
        assert_eq!(status_class(201), "2xx");
        assert_eq!(status_class(404), "4xx");
        assert_eq!(status_class(503), "5xx");
        assert_eq!(status_class(101), "other");
    }

    #[test]
    fn test_entity_counters_without_recorder() {
        track_entity_created("level");
        track_entity_deleted("level");
    }
}
