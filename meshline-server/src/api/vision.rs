use crate::api::{ApiError, IMAGE, UploadLimits};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub status: &'static str,
    pub analysis: String,
    pub media_type: String,
    pub bytes: usize,
    pub timestamp: String,
}

/// Placeholder image analysis.
pub async fn analyze_image(
    State(limits): State<UploadLimits>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<AnalysisResponse>, ApiError> {
    let upload = IMAGE.validate(limits, &headers, body)?;
    info!("Analyzing {} bytes of {}", upload.data.len(), upload.media_type);

    let format = upload
        .media_type
        .strip_prefix("image/")
        .unwrap_or(&upload.media_type)
        .to_ascii_uppercase();

    Ok(Json(AnalysisResponse {
        status: "success",
        analysis: format!(
            "Received a {} image of {} bytes. No objects of interest detected.",
            format,
            upload.data.len()
        ),
        bytes: upload.data.len(),
        media_type: upload.media_type,
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
