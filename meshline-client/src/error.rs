use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Local capture could not be started. The session stays usable and
    /// the caller may retry the join.
    #[error("local media unavailable: {0}")]
    MediaUnavailable(String),

    #[error("signaling connection failed: {0}")]
    Connect(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("server did not complete the greeting: {0}")]
    Handshake(String),

    #[error("WebRTC setup failed: {0}")]
    WebRtc(String),

    #[error("invalid request: {0}")]
    Core(#[from] meshline_core::CoreError),

    #[error("client session has stopped")]
    SessionClosed,
}
