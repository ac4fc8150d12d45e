use crate::registry::Registry;
use crate::session::session_command::{SessionCommand, SessionStats};
use crate::signaling::SignalingOutput;
use meshline_core::{ParticipantId, RoomId};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Connection lifecycle actor.
///
/// Sole owner of the [`Registry`]. Commands are handled one at a time, and a
/// registry mutation plus all notifications it causes finish before the next
/// command is read, so no participant observes a half-applied roster.
pub struct SessionCoordinator {
    registry: Registry,
    command_rx: mpsc::Receiver<SessionCommand>,
    signaling: Arc<dyn SignalingOutput>,
}

impl SessionCoordinator {
    pub fn new(
        registry: Registry,
        command_rx: mpsc::Receiver<SessionCommand>,
        signaling: Arc<dyn SignalingOutput>,
    ) -> Self {
        Self {
            registry,
            command_rx,
            signaling,
        }
    }

    pub async fn run(mut self) {
        info!("Session coordinator started");

        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }

        info!("Command channel closed. Session coordinator finished");
    }

    async fn handle_command(&mut self, cmd: SessionCommand) {
        match cmd {
            SessionCommand::Join {
                participant_id,
                room,
            } => self.join(participant_id, room).await,

            SessionCommand::Leave { participant_id } => {
                info!("Participant {} left explicitly", participant_id);
                self.remove_participant(&participant_id).await;
            }

            SessionCommand::Disconnect { participant_id } => {
                info!("Participant {} disconnected", participant_id);
                self.remove_participant(&participant_id).await;
            }

            SessionCommand::Stats { reply } => {
                let _ = reply.send(SessionStats {
                    rooms: self.registry.room_count(),
                    participants: self.registry.participant_count(),
                });
            }
        }
    }

    async fn join(&mut self, participant_id: ParticipantId, room: RoomId) {
        match self.registry.room_of(&participant_id).cloned() {
            Some(current) if current == room => {
                info!(
                    "Participant {} already in room '{}', resending roster",
                    participant_id, room
                );
                let roster = self.registry.join(participant_id, room);
                self.signaling.send_roster(participant_id, roster).await;
                return;
            }
            Some(current) => {
                info!(
                    "Participant {} switches from room '{}' to '{}'",
                    participant_id, current, room
                );
                self.remove_participant(&participant_id).await;
            }
            None => {}
        }

        info!("Participant {} joins room '{}'", participant_id, room);
        let roster = self.registry.join(participant_id, room);

        // Existing members hear about the newcomer before the newcomer can
        // start addressing them.
        for member in &roster {
            self.signaling
                .send_peer_joined(*member, participant_id)
                .await;
        }
        self.signaling.send_roster(participant_id, roster).await;
    }

    async fn remove_participant(&mut self, participant_id: &ParticipantId) {
        let Some(room) = self.registry.leave(participant_id) else {
            debug!("Participant {} was not in any room", participant_id);
            return;
        };

        let remaining = self.registry.members(&room).to_vec();
        for member in remaining {
            self.signaling.send_peer_left(member, *participant_id).await;
        }
    }
}
