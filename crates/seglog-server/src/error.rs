//! Mapping engine errors onto HTTP responses.
//!
//! Two codes are observable at the boundary: `out_of_range` for an offset
//! below the lowest retained or at/above the next one, and `internal` for
//! everything else.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use seglog_core::Error;

use crate::models::ErrorResponse;

/// Error code for a missing offset.
pub const OUT_OF_RANGE: &str = "out_of_range";
/// Error code for every other failure.
pub const INTERNAL: &str = "internal";

/// Wrapper turning an engine error into the API's error body.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            Error::OffsetOutOfRange(_) => (StatusCode::NOT_FOUND, OUT_OF_RANGE),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, INTERNAL),
        };
        (status, Json(ErrorResponse::new(code, self.0.to_string()))).into_response()
    }
}
