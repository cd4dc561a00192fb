//! Request and response bodies for the JSON API.

use serde::{Deserialize, Serialize};

use seglog_core::Record;

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceRequest {
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProduceResponse {
    pub offset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeQuery {
    pub offset: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConsumeResponse {
    pub record: Record,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
        }
    }
}
