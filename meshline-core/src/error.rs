use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid participant id: {0}")]
    InvalidParticipantId(String),

    #[error("room id must not be empty")]
    EmptyRoomId,

    #[error("malformed payload: {0}")]
    Payload(#[from] serde_json::Error),
}
