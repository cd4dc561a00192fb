pub mod consume;
pub mod produce;

use axum::Json;
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;

pub async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Serialize one NDJSON line for the streaming endpoints.
pub(crate) fn ndjson_line<T: Serialize>(value: &T) -> Bytes {
    let mut line = serde_json::to_vec(value).expect("serialize API model");
    line.push(b'\n');
    Bytes::from(line)
}
