use crate::api::ApiError;
use axum::Json;
use axum::extract::rejection::JsonRejection;
use serde::{Deserialize, Serialize};

pub const MAX_CHAT_CHARS: usize = 4096;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: &'static str,
    pub response: String,
    pub timestamp: String,
}

/// Echo-style assistant reply.
pub async fn chat(
    request: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(request) = request.map_err(|rejection| ApiError::InvalidJson(rejection.body_text()))?;

    let message = request
        .message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .ok_or(ApiError::MissingField("message"))?;

    if message.chars().count() > MAX_CHAT_CHARS {
        return Err(ApiError::FieldTooLong {
            field: "message",
            limit: MAX_CHAT_CHARS,
        });
    }

    Ok(Json(ChatResponse {
        status: "success",
        response: format!("You said: {}", message),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
