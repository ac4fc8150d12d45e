use crate::error::ClientError;
use crate::link::{LinkEvent, LinkFactory};
use crate::media::{MediaEvent, MediaSource};
use crate::roster::RosterConsumer;
use crate::signaling_client::SignalingConnection;
use crate::topology::{TopologyManager, TopologySnapshot};
use meshline_core::{ParticipantId, RoomId, SignalMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

pub enum ClientCommand {
    Join {
        room: RoomId,
        reply: oneshot::Sender<Result<(), ClientError>>,
    },
    Leave {
        reply: oneshot::Sender<()>,
    },
    Snapshot {
        reply: oneshot::Sender<TopologySnapshot>,
    },
    Disconnect,
}

/// Client event loop. The only owner of the topology, so roster events,
/// inbound envelopes, link events and local commands are applied one at a
/// time.
pub struct ClientSession {
    participant_id: ParticipantId,
    room: Option<RoomId>,
    /// Set once the server answers the join with a roster.
    confirmed: bool,
    roster: RosterConsumer,
    topology: TopologyManager,
    media_source: Arc<dyn MediaSource>,
    inbound_rx: mpsc::UnboundedReceiver<SignalMessage>,
    outbound_tx: mpsc::UnboundedSender<SignalMessage>,
    link_rx: mpsc::UnboundedReceiver<LinkEvent>,
    command_rx: mpsc::Receiver<ClientCommand>,
}

impl ClientSession {
    pub fn new(
        connection: SignalingConnection,
        factory: Arc<dyn LinkFactory>,
        media_source: Arc<dyn MediaSource>,
        command_rx: mpsc::Receiver<ClientCommand>,
        media_tx: mpsc::UnboundedSender<MediaEvent>,
    ) -> Self {
        let SignalingConnection {
            participant_id,
            inbound_rx,
            outbound_tx,
            ..
        } = connection;

        let (link_tx, link_rx) = mpsc::unbounded_channel();
        let topology = TopologyManager::new(
            participant_id,
            factory,
            link_tx,
            outbound_tx.clone(),
            media_tx,
        );

        Self {
            participant_id,
            room: None,
            confirmed: false,
            roster: RosterConsumer::new(participant_id),
            topology,
            media_source,
            inbound_rx,
            outbound_tx,
            link_rx,
            command_rx,
        }
    }

    pub async fn run(mut self) {
        info!("Client session {} started", self.participant_id);

        loop {
            tokio::select! {
                msg = self.inbound_rx.recv() => match msg {
                    Some(msg) => self.handle_server_event(msg).await,
                    None => {
                        info!("Signaling connection closed");
                        break;
                    }
                },

                Some(event) = self.link_rx.recv() => {
                    self.topology.handle_link_event(event).await;
                }

                cmd = self.command_rx.recv() => match cmd {
                    Some(ClientCommand::Disconnect) | None => break,
                    Some(cmd) => self.handle_command(cmd).await,
                },
            }
        }

        self.topology.close_all().await;
        info!("Client session {} finished", self.participant_id);
    }

    async fn handle_server_event(&mut self, msg: SignalMessage) {
        match msg {
            // Frames already in flight when we left. Nothing may be
            // negotiated on their behalf.
            SignalMessage::Roster { .. }
            | SignalMessage::PeerJoined { .. }
            | SignalMessage::PeerLeft { .. }
            | SignalMessage::Signal { .. }
                if self.room.is_none() =>
            {
                debug!("Ignoring {:?} outside any room", msg);
            }
            SignalMessage::Roster { .. }
            | SignalMessage::PeerJoined { .. }
            | SignalMessage::PeerLeft { .. } => {
                if matches!(msg, SignalMessage::Roster { .. }) {
                    self.confirmed = true;
                }
                for cmd in self.roster.consume(&msg) {
                    self.topology.apply(cmd).await;
                }
            }
            SignalMessage::Signal {
                sender, payload, ..
            } => self.topology.receive_envelope(sender, payload).await,
            other => debug!("Ignoring server event {:?}", other),
        }
    }

    async fn handle_command(&mut self, cmd: ClientCommand) {
        match cmd {
            ClientCommand::Join { room, reply } => {
                let _ = reply.send(self.join(room).await);
            }
            ClientCommand::Leave { reply } => {
                self.leave().await;
                let _ = reply.send(());
            }
            ClientCommand::Snapshot { reply } => {
                let mut snapshot = self.topology.snapshot();
                if self.confirmed {
                    snapshot.room = self.room.clone();
                }
                let _ = reply.send(snapshot);
            }
            ClientCommand::Disconnect => {}
        }
    }

    async fn join(&mut self, room: RoomId) -> Result<(), ClientError> {
        if !self.topology.has_media() {
            match self.media_source.acquire() {
                Ok(media) => self.topology.set_media(media),
                Err(e) => {
                    warn!("Not joining {}: {}", room, e);
                    return Err(e);
                }
            }
        }

        // The server moves us out of the old room; those links are dead.
        if self.room.as_ref().is_some_and(|current| current != &room) {
            self.topology.close_links().await;
        }

        if self.room.as_ref() != Some(&room) {
            self.confirmed = false;
        }
        info!("Joining room {}", room);
        self.room = Some(room.clone());
        self.outbound_tx
            .send(SignalMessage::Join { room })
            .map_err(|_| ClientError::SessionClosed)
    }

    async fn leave(&mut self) {
        let Some(room) = self.room.take() else {
            debug!("Leave requested outside any room");
            return;
        };

        info!("Leaving room {}", room);
        self.confirmed = false;
        self.topology.close_all().await;
        let _ = self.outbound_tx.send(SignalMessage::Leave);
    }
}

/// Cheap handle for driving a running [`ClientSession`].
pub struct ClientHandle {
    participant_id: ParticipantId,
    command_tx: mpsc::Sender<ClientCommand>,
    task: JoinHandle<()>,
}

impl ClientHandle {
    pub(crate) fn spawn(session: ClientSession, command_tx: mpsc::Sender<ClientCommand>) -> Self {
        let participant_id = session.participant_id;
        let task = tokio::spawn(session.run());
        Self {
            participant_id,
            command_tx,
            task,
        }
    }

    pub fn participant_id(&self) -> ParticipantId {
        self.participant_id
    }

    /// Acquires local media and joins `room`. A media failure is returned
    /// and the session stays usable.
    pub async fn join(&self, room: &str) -> Result<(), ClientError> {
        let room = RoomId::new(room)?;
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::Join { room, reply }).await?;
        rx.await.map_err(|_| ClientError::SessionClosed)?
    }

    /// Stops local media, closes every link and leaves the room.
    pub async fn leave(&self) -> Result<(), ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::Leave { reply }).await?;
        rx.await.map_err(|_| ClientError::SessionClosed)
    }

    pub async fn snapshot(&self) -> Result<TopologySnapshot, ClientError> {
        let (reply, rx) = oneshot::channel();
        self.send(ClientCommand::Snapshot { reply }).await?;
        rx.await.map_err(|_| ClientError::SessionClosed)
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Tears everything down and closes the signaling socket.
    pub async fn disconnect(self) {
        let _ = self.command_tx.send(ClientCommand::Disconnect).await;
        let _ = self.task.await;
    }

    async fn send(&self, cmd: ClientCommand) -> Result<(), ClientError> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| ClientError::SessionClosed)
    }
}
