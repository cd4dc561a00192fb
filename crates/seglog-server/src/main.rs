//! Seglog server entry point.
//!
//! Configuration is environment variables:
//!
//! - `SEGLOG_ADDR`: bind address (default: 0.0.0.0:8080)
//! - `SEGLOG_DATA_DIR`: log directory (default: ./data/log)
//! - `SEGLOG_MAX_STORE_BYTES`: per-segment store cap (default: 1024)
//! - `SEGLOG_MAX_INDEX_BYTES`: per-segment index cap (default: 1024)
//! - `RUST_LOG`: tracing filter (default: info)
//!
//! On SIGINT/SIGTERM the server stops accepting connections, drains the
//! in-flight ones, then closes the log so every segment flushes its store
//! buffer and truncates its index file to the entries actually written.

use std::sync::Arc;

use seglog_server::{create_router, AppState};
use seglog_storage::{Config, Log, SegmentConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let bind_addr: std::net::SocketAddr = std::env::var("SEGLOG_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
        .parse()?;

    let data_dir =
        std::env::var("SEGLOG_DATA_DIR").unwrap_or_else(|_| "./data/log".to_string());

    let mut segment = SegmentConfig::default();
    if let Ok(v) = std::env::var("SEGLOG_MAX_STORE_BYTES") {
        segment.max_store_bytes = v.parse()?;
    }
    if let Ok(v) = std::env::var("SEGLOG_MAX_INDEX_BYTES") {
        segment.max_index_bytes = v.parse()?;
    }

    tracing::info!("Opening log at {}", data_dir);
    let log = Arc::new(Log::open(&data_dir, Config { segment })?);

    let router = create_router(AppState { log: log.clone() });

    tracing::info!("seglog server listening on {}", bind_addr);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Closing log");
    match Arc::try_unwrap(log) {
        Ok(log) => log.close()?,
        Err(_) => tracing::warn!("log still shared at shutdown; segments not closed cleanly"),
    }

    tracing::info!("seglog server shut down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl+C), initiating graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        },
    }
}
