use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Uniform failure taxonomy of the stateless HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no {0} provided in the request")]
    EmptyPayload(&'static str),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("{field} is longer than {limit} characters")]
    FieldTooLong { field: &'static str, limit: usize },

    #[error("unsupported media type '{found}', expected one of: {expected}")]
    UnsupportedMediaType { found: String, expected: String },

    #[error("payload exceeds the {limit} byte limit")]
    PayloadTooLarge { limit: usize },

    #[error("invalid JSON body: {0}")]
    InvalidJson(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::EmptyPayload(_)
            | Self::MissingField(_)
            | Self::FieldTooLong { .. }
            | Self::InvalidJson(_) => StatusCode::BAD_REQUEST,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else {
            warn!("Rejected request: {}", self);
        }

        let body = json!({
            "status": "error",
            "message": self.to_string(),
            "timestamp": chrono::Utc::now().to_rfc3339(),
        });
        (status, Json(body)).into_response()
    }
}
