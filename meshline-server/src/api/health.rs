use crate::signaling::SignalingService;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

const SERVICE_NAME: &str = "meshline-server";

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub rooms: usize,
    pub participants: usize,
    pub connections: usize,
    pub timestamp: String,
}

/// Liveness plus a snapshot of the registry. Reports `degraded` once the
/// session coordinator has stopped.
pub async fn health(State(service): State<SignalingService>) -> (StatusCode, Json<HealthResponse>) {
    let timestamp = chrono::Utc::now().to_rfc3339();
    let connections = service.connection_count();

    match service.stats().await {
        Some(stats) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok",
                service: SERVICE_NAME,
                version: env!("CARGO_PKG_VERSION"),
                rooms: stats.rooms,
                participants: stats.participants,
                connections,
                timestamp,
            }),
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "degraded",
                service: SERVICE_NAME,
                version: env!("CARGO_PKG_VERSION"),
                rooms: 0,
                participants: 0,
                connections,
                timestamp,
            }),
        ),
    }
}
