//! The HTTP-facing error type (§7): client errors become 4xx with a message
//! naming the offending field; anything else is a 500. Transient upstream
//! failures never reach this type — the orchestrator already converts them
//! into a fallback answer before the handler sees a result (§7 Propagation
//! policy).

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{field}: {message}")]
    InvalidRequest { field: String, message: String },

    #[error("not found")]
    NotFound,

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn invalid_request(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, field, message) = match &self {
            ServerError::InvalidRequest { field, message } => (StatusCode::BAD_REQUEST, field.as_str(), message.clone()),
            ServerError::NotFound => (StatusCode::NOT_FOUND, "", "not found".to_string()),
            ServerError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, "", message.clone()),
        };

        if field.is_empty() {
            (status, Json(json!({ "error": message }))).into_response()
        } else {
            (status, Json(json!({ "error": message, "field": field }))).into_response()
        }
    }
}

impl From<query_engine_core::Error> for ServerError {
    fn from(err: query_engine_core::Error) -> Self {
        ServerError::Internal(err.to_string())
    }
}
