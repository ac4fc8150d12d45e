use meshline_core::ParticipantId;
use async_trait::async_trait;

/// Outbound side of the signaling layer, used by the session coordinator to
/// notify individual participants. Each call targets exactly one connection;
/// there is no room-wide broadcast.
#[async_trait]
pub trait SignalingOutput: Send + Sync {
    /// Send the pre-join member snapshot to the joiner.
    async fn send_roster(&self, participant_id: ParticipantId, roster: Vec<ParticipantId>);

    /// Tell an existing member that `joined` entered the room.
    async fn send_peer_joined(&self, participant_id: ParticipantId, joined: ParticipantId);

    /// Tell a remaining member that `left` is gone.
    async fn send_peer_left(&self, participant_id: ParticipantId, left: ParticipantId);
}
