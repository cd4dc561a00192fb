//! Record produce endpoints.

use std::convert::Infallible;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use futures::stream::{self, StreamExt};

use seglog_core::CommitLog;

use crate::error::{ApiError, INTERNAL};
use crate::handlers::ndjson_line;
use crate::models::{ErrorResponse, ProduceRequest, ProduceResponse};
use crate::AppState;

pub async fn produce(
    State(state): State<AppState>,
    Json(req): Json<ProduceRequest>,
) -> Result<Json<ProduceResponse>, ApiError> {
    let offset = state.log.append(req.record)?;
    Ok(Json(ProduceResponse { offset }))
}

/// Streaming produce: the request body is newline-delimited JSON produce
/// requests, the response is one `{"offset": n}` acknowledgement per
/// request, in order, streamed back as the requests arrive. A malformed
/// line or an append failure emits an error line and ends the stream.
pub async fn produce_stream(State(state): State<AppState>, body: Body) -> impl IntoResponse {
    struct Acks {
        chunks: axum::body::BodyDataStream,
        buffer: Vec<u8>,
        exhausted: bool,
        failed: bool,
        log: Arc<dyn CommitLog>,
    }

    let acks = Acks {
        chunks: body.into_data_stream(),
        buffer: Vec::new(),
        exhausted: false,
        failed: false,
        log: state.log.clone(),
    };

    let lines = stream::unfold(acks, |mut acks| async move {
        if acks.failed {
            return None;
        }
        loop {
            if let Some(line) = next_line(&mut acks.buffer, acks.exhausted) {
                if line.iter().all(u8::is_ascii_whitespace) {
                    continue;
                }
                let ack = match serde_json::from_slice::<ProduceRequest>(&line) {
                    Ok(req) => match acks.log.append(req.record) {
                        Ok(offset) => ndjson_line(&ProduceResponse { offset }),
                        Err(e) => {
                            acks.failed = true;
                            ndjson_line(&ErrorResponse::new(INTERNAL, e.to_string()))
                        }
                    },
                    Err(e) => {
                        acks.failed = true;
                        ndjson_line(&ErrorResponse::new(INTERNAL, format!("malformed request: {e}")))
                    }
                };
                return Some((Ok::<_, Infallible>(ack), acks));
            }

            if acks.exhausted {
                return None;
            }
            match acks.chunks.next().await {
                Some(Ok(chunk)) => acks.buffer.extend_from_slice(&chunk),
                // A body read error ends the request stream; everything
                // acknowledged so far stands.
                Some(Err(_)) | None => acks.exhausted = true,
            }
        }
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(lines),
    )
}

/// Pop the next newline-terminated line from `buffer`. Once the request
/// body is exhausted, a trailing unterminated line counts too.
fn next_line(buffer: &mut Vec<u8>, exhausted: bool) -> Option<Vec<u8>> {
    if let Some(i) = buffer.iter().position(|&b| b == b'\n') {
        let mut line: Vec<u8> = buffer.drain(..=i).collect();
        line.pop();
        return Some(line);
    }
    if exhausted && !buffer.is_empty() {
        return Some(std::mem::take(buffer));
    }
    None
}
