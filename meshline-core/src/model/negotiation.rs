use crate::error::CoreError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Client-side view of a signal payload. The relay only ever sees the
/// serialized [`Value`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NegotiationPayload {
    Offer {
        sdp: String,
    },
    Answer {
        sdp: String,
    },
    Candidate {
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    },
}

impl NegotiationPayload {
    pub fn to_value(&self) -> Result<Value, CoreError> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(value)?)
    }

    pub fn is_offer(&self) -> bool {
        matches!(self, Self::Offer { .. })
    }
}
