//! Seglog HTTP/JSON API
//!
//! Thin front-end over the commit log. Four data-plane endpoints plus a
//! health check:
//!
//! - `POST /api/v1/produce`: append one record, respond with its offset
//! - `GET  /api/v1/consume?offset=N`: read the record at an offset
//! - `POST /api/v1/produce/stream`: NDJSON in, NDJSON offset acks out,
//!   acknowledged in order as the requests arrive
//! - `GET  /api/v1/consume/stream?offset=N`: NDJSON records in offset
//!   order; waits at the head of the log for new records
//! - `GET  /health`
//!
//! The handlers consume the log exclusively through the [`CommitLog`]
//! trait, so tests can swap in doubles and the storage engine stays
//! replaceable.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use seglog_core::CommitLog;

pub mod error;
pub mod handlers;
pub mod models;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub log: Arc<dyn CommitLog>,
}

/// Create the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/produce", post(handlers::produce::produce))
        .route("/produce/stream", post(handlers::produce::produce_stream))
        .route("/consume", get(handlers::consume::consume))
        .route("/consume/stream", get(handlers::consume::consume_stream))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .route("/health", get(handlers::health))
}
