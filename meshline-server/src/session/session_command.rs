use meshline_core::{ParticipantId, RoomId};
use tokio::sync::oneshot;

/// Commands delivered to the session coordinator by connection handlers.
#[derive(Debug)]
pub enum SessionCommand {
    /// The participant asked to enter a room.
    Join {
        participant_id: ParticipantId,
        room: RoomId,
    },

    /// The participant asked to leave its room but keeps its connection.
    Leave { participant_id: ParticipantId },

    /// The participant's transport closed.
    Disconnect { participant_id: ParticipantId },

    /// Point-in-time registry counters.
    Stats { reply: oneshot::Sender<SessionStats> },
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub rooms: usize,
    pub participants: usize,
}
