use crate::api::{AUDIO, ApiError, UploadLimits};
use axum::Json;
use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::http::HeaderMap;
use bytes::Bytes;
use serde::Serialize;
use tracing::info;

const SAMPLE_TRANSCRIPTS: [&str; 4] = [
    "Hello, can everyone hear me?",
    "Let's start the meeting.",
    "I'll share my screen in a moment.",
    "Thanks everyone, talk soon.",
];

#[derive(Debug, Serialize)]
pub struct RecognitionResponse {
    pub status: &'static str,
    pub text: String,
    pub confidence: f32,
    pub media_type: String,
    pub bytes: usize,
    pub timestamp: String,
}

/// Placeholder speech recognition. The transcript is picked deterministically
/// from the upload size so clients get stable output.
pub async fn recognize_voice(
    State(limits): State<UploadLimits>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<RecognitionResponse>, ApiError> {
    let upload = AUDIO.validate(limits, &headers, body)?;
    let transcript = SAMPLE_TRANSCRIPTS[upload.data.len() % SAMPLE_TRANSCRIPTS.len()];
    info!(
        "Recognized {} bytes of {}",
        upload.data.len(),
        upload.media_type
    );

    Ok(Json(RecognitionResponse {
        status: "success",
        text: transcript.to_owned(),
        confidence: 0.92,
        media_type: upload.media_type,
        bytes: upload.data.len(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    }))
}
