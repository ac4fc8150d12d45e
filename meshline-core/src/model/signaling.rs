use crate::model::participant::ParticipantId;
use crate::model::room::RoomId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

/// Boundary events exchanged over the signaling socket.
///
/// Frames are adjacently tagged JSON: `{"op": "join", "d": {"room": "r1"}}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", content = "d", rename_all = "snake_case")]
pub enum SignalMessage {
    /// Server -> client, first frame on every connection.
    Welcome { participant_id: ParticipantId },
    /// Server -> client, sent right after `Welcome`.
    IceConfig { ice_servers: Vec<IceServerConfig> },
    /// Client -> server.
    Join { room: RoomId },
    /// Client -> server. Same cleanup as a transport disconnect.
    Leave,
    /// Server -> joiner only: members present before the join.
    Roster { participants: Vec<ParticipantId> },
    /// Server -> each existing member.
    PeerJoined { participant_id: ParticipantId },
    /// Server -> each remaining member.
    PeerLeft { participant_id: ParticipantId },
    /// Both directions. `payload` is never inspected by the server.
    Signal {
        target: ParticipantId,
        sender: ParticipantId,
        payload: Value,
    },
}
