use crate::session::{SessionCommand, SessionStats};
use crate::signaling::SignalingOutput;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use meshline_core::{IceServerConfig, ParticipantId, SignalMessage};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ParticipantId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Live-connection table plus the envelope relay.
///
/// Cheap to clone; all clones share the same table.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
    pub(crate) session_tx: mpsc::Sender<SessionCommand>,
}

impl SignalingService {
    pub fn new(session_tx: mpsc::Sender<SessionCommand>, ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
            session_tx,
        }
    }

    pub fn get_ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn add_peer(&self, participant_id: ParticipantId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(participant_id, tx);
    }

    pub fn remove_peer(&self, participant_id: &ParticipantId) {
        self.inner.peers.remove(participant_id);
    }

    pub fn is_connected(&self, participant_id: &ParticipantId) -> bool {
        self.inner.peers.contains_key(participant_id)
    }

    pub fn connection_count(&self) -> usize {
        self.inner.peers.len()
    }

    /// Forwards an opaque payload from `sender` to `target`.
    ///
    /// Best effort: if `target` has no live connection the envelope is
    /// dropped and the sender is not told.
    pub fn relay(&self, sender: ParticipantId, target: ParticipantId, payload: Value) {
        if !self.is_connected(&target) {
            debug!(
                "Dropping envelope {} -> {}: target not connected",
                sender, target
            );
            return;
        }

        debug!("Relaying envelope {} -> {}", sender, target);
        self.send_signal(
            target,
            SignalMessage::Signal {
                target,
                sender,
                payload,
            },
        );
    }

    pub fn send_signal(&self, participant_id: ParticipantId, msg: SignalMessage) {
        let Some(peer) = self.inner.peers.get(&participant_id) else {
            debug!(
                "Attempted to send signal to disconnected participant {}",
                participant_id
            );
            return;
        };

        match serde_json::to_string(&msg) {
            Ok(json) => {
                if let Err(e) = peer.send(Message::Text(json.into())) {
                    error!("Failed to send WS message to {}: {:?}", participant_id, e);
                }
            }
            Err(e) => error!("Failed to serialize signal message: {}", e),
        }
    }

    /// Registry counters, read through the coordinator so they are never
    /// observed mid-mutation.
    pub async fn stats(&self) -> Option<SessionStats> {
        let (reply, rx) = oneshot::channel();
        self.session_tx
            .send(SessionCommand::Stats { reply })
            .await
            .ok()?;
        rx.await.ok()
    }
}

#[async_trait]
impl SignalingOutput for SignalingService {
    async fn send_roster(&self, participant_id: ParticipantId, roster: Vec<ParticipantId>) {
        self.send_signal(
            participant_id,
            SignalMessage::Roster {
                participants: roster,
            },
        );
    }

    async fn send_peer_joined(&self, participant_id: ParticipantId, joined: ParticipantId) {
        self.send_signal(
            participant_id,
            SignalMessage::PeerJoined {
                participant_id: joined,
            },
        );
    }

    async fn send_peer_left(&self, participant_id: ParticipantId, left: ParticipantId) {
        self.send_signal(
            participant_id,
            SignalMessage::PeerLeft {
                participant_id: left,
            },
        );
    }
}
