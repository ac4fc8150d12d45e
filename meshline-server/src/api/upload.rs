use crate::api::ApiError;
use axum::extract::rejection::BytesRejection;
use axum::http::{HeaderMap, StatusCode, header};
use bytes::Bytes;

#[derive(Debug, Clone, Copy)]
pub struct UploadLimits {
    pub max_bytes: usize,
}

/// A family of binary uploads and the media types it accepts.
pub struct UploadKind {
    pub name: &'static str,
    pub accepted: &'static [&'static str],
}

pub const AUDIO: UploadKind = UploadKind {
    name: "audio",
    accepted: &[
        "audio/wav",
        "audio/x-wav",
        "audio/mpeg",
        "audio/ogg",
        "audio/mp4",
        "audio/x-m4a",
    ],
};

pub const IMAGE: UploadKind = UploadKind {
    name: "image",
    accepted: &["image/jpeg", "image/png", "image/webp", "image/gif"],
};

/// A body that passed validation, with its normalized media type.
#[derive(Debug)]
pub struct Upload {
    pub media_type: String,
    pub data: Bytes,
}

impl UploadKind {
    pub fn validate(
        &self,
        limits: UploadLimits,
        headers: &HeaderMap,
        body: Result<Bytes, BytesRejection>,
    ) -> Result<Upload, ApiError> {
        let data = body.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                ApiError::PayloadTooLarge {
                    limit: limits.max_bytes,
                }
            } else {
                ApiError::Internal(rejection.body_text())
            }
        })?;

        if data.is_empty() {
            return Err(ApiError::EmptyPayload(self.name));
        }
        if data.len() > limits.max_bytes {
            return Err(ApiError::PayloadTooLarge {
                limit: limits.max_bytes,
            });
        }

        let media_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| {
                value
                    .split(';')
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_ascii_lowercase()
            })
            .unwrap_or_default();

        if !self.accepted.contains(&media_type.as_str()) {
            return Err(ApiError::UnsupportedMediaType {
                found: media_type,
                expected: self.accepted.join(", "),
            });
        }

        Ok(Upload { media_type, data })
    }
}
