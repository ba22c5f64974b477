use std::net::SocketAddr;

use dotenvy::dotenv;
use kaayjang::logging::{init_tracing, shutdown_tracer};
use kaayjang::metrics::init_metrics;
use kaayjang::router::init_router_with_metrics;
use kaayjang::state::AppState;
use kaayjang_config::DatabaseConfig;
use kaayjang_db::{init_db_pool, run_migrations};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    dotenv().ok();

    if let Err(e) = init_tracing() {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    let database_config = match DatabaseConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid database configuration");
            std::process::exit(1);
        }
    };

    let pool = match init_db_pool(&database_config).await {
        Ok(pool) => pool,
        Err(e) => {
            error!(error = %e, "Failed to connect to database");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(&pool).await {
        error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    let metrics = match init_metrics() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(error = %e, "Prometheus exporter unavailable, serving without /metrics");
            None
        }
    };

    let state = AppState::from_env(pool.clone());
    let address = state.server_config.bind_address();
    let port = state.server_config.port;
    let app = init_router_with_metrics(state, metrics);

    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(error = %e, address = %address, "Failed to bind");
            std::process::exit(1);
        }
    };

    info!("🚀 Server running on http://localhost:{}", port);
    info!("📚 Swagger UI available at http://localhost:{}/swagger-ui", port);
    info!("📖 Scalar UI available at http://localhost:{}/scalar", port);

    if let Err(e) = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    {
        error!(error = %e, "Server error");
    }

    pool.close().await;
    info!("Database pool closed");
    shutdown_tracer().await;
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
