use meshline_core::{ParticipantId, SignalMessage};

/// What the topology manager should do about one remote participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TopologyCommand {
    /// We are the newcomer: open a link as initiator.
    Initiate(ParticipantId),
    /// The remote is the newcomer and will send the offer.
    Await(ParticipantId),
    Teardown(ParticipantId),
}

/// Turns roster notifications into topology commands.
///
/// Stateless. The newcomer always initiates, so every unordered pair ends up
/// with exactly one initiator.
#[derive(Debug, Clone, Copy)]
pub struct RosterConsumer {
    local: ParticipantId,
}

impl RosterConsumer {
    pub fn new(local: ParticipantId) -> Self {
        Self { local }
    }

    pub fn consume(&self, event: &SignalMessage) -> Vec<TopologyCommand> {
        match event {
            SignalMessage::Roster { participants } => participants
                .iter()
                .filter(|id| **id != self.local)
                .map(|id| TopologyCommand::Initiate(*id))
                .collect(),
            SignalMessage::PeerJoined { participant_id } if *participant_id != self.local => {
                vec![TopologyCommand::Await(*participant_id)]
            }
            SignalMessage::PeerLeft { participant_id } if *participant_id != self.local => {
                vec![TopologyCommand::Teardown(*participant_id)]
            }
            _ => vec![],
        }
    }
}
