//! Typed errors and HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Startup-only failures: bad or incomplete connection settings. Fatal in the binary.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing setting: {0}")]
    Missing(&'static str),
    #[error("invalid setting {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Everything a request can fail with. Every variant crosses the HTTP
/// boundary as the `{error, traceback}` envelope.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("unknown resource '{0}'")]
    UnknownResource(String),
    #[error("'{column}' is not a column of '{resource}'; columns are: {known:?}")]
    UnknownColumn {
        resource: String,
        column: String,
        known: Vec<String>,
    },
    #[error("malformed query: {0}")]
    MalformedQuery(String),
    #[error("'{0}' has no 'id' primary key column; identifier-addressed operations need one")]
    UnsupportedOperation(String),
    #[error("{method} is not allowed on {path}")]
    InvalidMethodForPath { method: String, path: String },
    #[error("database: {0}")]
    Storage(#[from] sqlx::Error),
}

impl ApiError {
    pub fn unknown_column(resource: &str, column: &str, known: impl Iterator<Item = String>) -> Self {
        ApiError::UnknownColumn {
            resource: resource.to_string(),
            column: column.to_string(),
            known: known.collect(),
        }
    }
}

impl IntoResponse for ApiError {
    // Errors are signaled by the envelope, not the status code: the original
    // contract answers 200 for every failure and clients key off `error`.
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "request failed");
        let body = crate::response::error_envelope(&self.to_string(), &format!("{:?}", self));
        (StatusCode::OK, Json(body)).into_response()
    }
}
