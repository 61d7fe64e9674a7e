use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Query-level failures of the counting store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("no such key")]
    NotFound,
}

/// A scheduled decrement found nothing to decrement.
///
/// Keys and value entries are never removed, so any of these means an
/// increment was lost somewhere before its expiry fired.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UnexpectedState {
    #[error("no counters exist for the key")]
    MissingKey,

    #[error("no counter exists for value {value}")]
    MissingValue { value: i64 },

    #[error("counter for value {value} is already zero")]
    Underflow { value: i64 },
}

/// Rejected request payloads. The store is never touched when these occur.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("invalid body JSON: {0}")]
    MalformedBody(String),

    #[error("could not interpret value - ensure JSON is correct and that value does not round to zero")]
    ZeroValue,

    #[error("value {0} is outside the supported integer range")]
    OutOfRange(f64),
}

/// Errors surfaced by the HTTP routes.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Store(StoreError::NotFound) => StatusCode::NOT_FOUND,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// Startup failures of the binary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("config.json not found in {0} or its parent directory")]
    ConfigMissing(String),

    #[error("failed to read {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("expiry_seconds = {0} is too large to schedule")]
    ExpiryOutOfRange(u64),

    #[error("invalid config.json: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
