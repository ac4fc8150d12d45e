mod api_error;
mod chat;
mod health;
mod upload;
mod vision;
mod voice;

pub use api_error::*;
pub use chat::*;
pub use health::*;
pub use upload::*;
pub use vision::*;
pub use voice::*;

use crate::server::AppState;
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};

/// Stateless HTTP collaborators, mounted under `/api`.
pub fn router(limits: UploadLimits) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/voice/recognize", post(recognize_voice))
        .route("/vision/analyze", post(analyze_image))
        .route("/chat", post(chat))
        // One byte of headroom so oversized bodies reach the handler's own check.
        .layer(DefaultBodyLimit::max(limits.max_bytes.saturating_add(1)))
}
