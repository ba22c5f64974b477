use axum::{
    extract::{MatchedPath, Request},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use opentelemetry::{KeyValue, global, trace::TraceError};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{
    Resource,
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, Tracer},
};
use opentelemetry_semantic_conventions::resource::{SERVICE_NAME, SERVICE_VERSION};
use std::time::Instant;
use tracing::{Instrument, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt, util::SubscriberInitExt};

use crate::metrics::is_observability_enabled;

pub const REQUEST_ID_HEADER: &str = "x-request-id";

const LOG_DIR: &str = "storage/logs";

/// Runs the request inside an `http_request` span carrying a fresh request
/// id, then logs the outcome at a level matching the status class. The id is
/// echoed back in `x-request-id`.
pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());
    let request_id = uuid::Uuid::new_v4().to_string();

    let span = info_span!(
        "http_request",
        request_id = %request_id,
        method = %req.method(),
        path = %path,
    );

    let mut response = async move {
        let response = next.run(req).await;
        let status = response.status().as_u16();
        let latency_ms = start.elapsed().as_millis();

        match status {
            500..=599 => error!(status, latency_ms, "Server error"),
            400..=499 => warn!(status, latency_ms, "Client error"),
            _ => info!(status, latency_ms, "Request completed"),
        }
        response
    }
    .instrument(span)
    .await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }

    response
}

fn init_tracer() -> Result<Tracer, TraceError> {
    let otlp_endpoint = std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT")
        .unwrap_or_else(|_| "http://localhost:4317".to_string());

    global::set_text_map_propagator(TraceContextPropagator::new());

    let resource = Resource::new(vec![
        KeyValue::new(SERVICE_NAME, env!("CARGO_PKG_NAME")),
        KeyValue::new(SERVICE_VERSION, env!("CARGO_PKG_VERSION")),
        KeyValue::new(
            "environment",
            std::env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        ),
    ]);

    let otlp_exporter = opentelemetry_otlp::new_exporter()
        .tonic()
        .with_endpoint(otlp_endpoint);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(otlp_exporter)
        .with_trace_config(
            opentelemetry_sdk::trace::Config::default()
                .with_sampler(Sampler::AlwaysOn)
                .with_id_generator(RandomIdGenerator::default())
                .with_resource(resource),
        )
        .install_batch(runtime::Tokio)
}

/// Installs the global subscriber: console output, a daily error log, a
/// daily JSON log and, when observability is enabled and a collector is
/// configured, an OTLP exporter.
///
/// Must run inside the tokio runtime.
pub fn init_tracing() -> std::io::Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::fmt;

    std::fs::create_dir_all(LOG_DIR)?;

    let console_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}=info,tower_http=warn,sqlx=warn,tonic=info",
            env!("CARGO_CRATE_NAME")
        ))
    });

    let console_layer = fmt::layer()
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(console_filter);

    let file_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "kaayjang.log");

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    // Structured logs, one JSON object per line.
    let json_appender = RollingFileAppender::new(Rotation::DAILY, LOG_DIR, "kaayjang.json");

    let json_layer = fmt::layer()
        .json()
        .with_writer(json_appender)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    let registry = tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer);

    if !is_observability_enabled() {
        registry.init();
        info!("Tracing initialized without OpenTelemetry (observability disabled)");
        return Ok(());
    }

    match init_tracer() {
        Ok(tracer) => {
            registry
                .with(tracing_opentelemetry::layer().with_tracer(tracer))
                .init();
            info!("Tracing initialized with OpenTelemetry and file logging");
        }
        Err(e) => {
            registry.init();
            warn!(error = %e, "Failed to initialize OpenTelemetry, continuing with file logging only");
        }
    }

    Ok(())
}

pub async fn shutdown_tracer() {
    if is_observability_enabled() {
        info!("Shutting down OpenTelemetry tracer...");
        global::shutdown_tracer_provider();
    }
}
