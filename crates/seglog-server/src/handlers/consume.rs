//! Record consume endpoints.

use std::convert::Infallible;
use std::time::Duration;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use futures::stream;

use seglog_core::Error;

use crate::error::{ApiError, INTERNAL, OUT_OF_RANGE};
use crate::handlers::ndjson_line;
use crate::models::{ConsumeQuery, ConsumeResponse, ErrorResponse};
use crate::AppState;

/// How long the streaming consumer waits before re-checking the head of
/// the log for new records.
const WAIT_FOR_RECORDS: Duration = Duration::from_millis(50);

pub async fn consume(
    State(state): State<AppState>,
    Query(query): Query<ConsumeQuery>,
) -> Result<Json<ConsumeResponse>, ApiError> {
    let record = state.log.read(query.offset)?;
    Ok(Json(ConsumeResponse { record }))
}

/// Streaming consume: emits records as NDJSON in offset order starting at
/// `offset`. At the head of the log the stream waits for new records. An
/// offset below the lowest retained one has been truncated away and will
/// never appear, so that ends the stream with an error line instead of
/// waiting forever.
pub async fn consume_stream(
    State(state): State<AppState>,
    Query(query): Query<ConsumeQuery>,
) -> impl IntoResponse {
    let log = state.log.clone();

    let lines = stream::unfold((query.offset, false), move |(offset, failed)| {
        let log = log.clone();
        async move {
            if failed {
                return None;
            }
            loop {
                match log.read(offset) {
                    Ok(record) => {
                        let line = ndjson_line(&ConsumeResponse { record });
                        return Some((Ok::<_, Infallible>(line), (offset + 1, false)));
                    }
                    Err(Error::OffsetOutOfRange(_)) if offset < log.lowest_offset() => {
                        let line = ndjson_line(&ErrorResponse::new(
                            OUT_OF_RANGE,
                            format!("offset {offset} is below the lowest retained offset"),
                        ));
                        return Some((Ok(line), (offset, true)));
                    }
                    Err(Error::OffsetOutOfRange(_)) => {
                        tokio::time::sleep(WAIT_FOR_RECORDS).await;
                    }
                    Err(e) => {
                        let line = ndjson_line(&ErrorResponse::new(INTERNAL, e.to_string()));
                        return Some((Ok(line), (offset, true)));
                    }
                }
            }
        }
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
}
