use crate::link::{LinkEvent, LinkEventKind, LinkFactory, LinkRole, LinkState, NegotiatedLink};
use crate::media::{LocalMedia, MediaEvent};
use crate::roster::TopologyCommand;
use meshline_core::{NegotiationPayload, ParticipantId, RoomId, SignalMessage};
use serde_json::Value;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Upper bound on remembered departures. Ids are never reused, so only
/// recent ones can still have envelopes in flight.
const DEPARTED_CAPACITY: usize = 256;

struct PeerLink {
    link_id: u64,
    role: LinkRole,
    state: LinkState,
    link: Box<dyn NegotiatedLink>,
    has_media: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSnapshot {
    pub remote: ParticipantId,
    pub role: LinkRole,
    pub state: LinkState,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopologySnapshot {
    /// Room the server has confirmed with a roster, if any.
    pub room: Option<RoomId>,
    pub links: Vec<LinkSnapshot>,
    pub awaiting: Vec<ParticipantId>,
}

impl TopologySnapshot {
    pub fn link(&self, remote: &ParticipantId) -> Option<&LinkSnapshot> {
        self.links.iter().find(|link| &link.remote == remote)
    }

    pub fn connected_count(&self) -> usize {
        self.links
            .iter()
            .filter(|link| link.state == LinkState::Connected)
            .count()
    }
}

/// Owns at most one [`PeerLink`] per remote participant.
///
/// Not shared: the client session drives it from a single task, which keeps
/// link-set mutations ordered with the roster stream.
/// Remotes we saw leave, oldest first. Late envelopes from them must not
/// open a link.
#[derive(Default)]
struct Departed {
    order: VecDeque<ParticipantId>,
    members: HashSet<ParticipantId>,
}

impl Departed {
    fn insert(&mut self, remote: ParticipantId) {
        if !self.members.insert(remote) {
            return;
        }
        self.order.push_back(remote);
        if self.order.len() > DEPARTED_CAPACITY {
            if let Some(oldest) = self.order.pop_front() {
                self.members.remove(&oldest);
            }
        }
    }

    fn remove(&mut self, remote: &ParticipantId) {
        if self.members.remove(remote) {
            self.order.retain(|id| id != remote);
        }
    }

    fn contains(&self, remote: &ParticipantId) -> bool {
        self.members.contains(remote)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.members.len()
    }
}

pub struct TopologyManager {
    local: ParticipantId,
    factory: Arc<dyn LinkFactory>,
    links: HashMap<ParticipantId, PeerLink>,
    awaiting: HashSet<ParticipantId>,
    departed: Departed,
    media: Option<LocalMedia>,
    next_link_id: u64,
    events_tx: mpsc::UnboundedSender<LinkEvent>,
    signal_tx: mpsc::UnboundedSender<SignalMessage>,
    media_tx: mpsc::UnboundedSender<MediaEvent>,
}

impl TopologyManager {
    pub fn new(
        local: ParticipantId,
        factory: Arc<dyn LinkFactory>,
        events_tx: mpsc::UnboundedSender<LinkEvent>,
        signal_tx: mpsc::UnboundedSender<SignalMessage>,
        media_tx: mpsc::UnboundedSender<MediaEvent>,
    ) -> Self {
        Self {
            local,
            factory,
            links: HashMap::new(),
            awaiting: HashSet::new(),
            departed: Departed::default(),
            media: None,
            next_link_id: 0,
            events_tx,
            signal_tx,
            media_tx,
        }
    }

    pub fn has_media(&self) -> bool {
        self.media.is_some()
    }

    pub fn set_media(&mut self, media: LocalMedia) {
        if let Some(previous) = self.media.replace(media) {
            previous.stop();
        }
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub async fn apply(&mut self, cmd: TopologyCommand) {
        match cmd {
            TopologyCommand::Initiate(remote) => self.initiate(remote).await,
            TopologyCommand::Await(remote) => self.await_link(remote),
            TopologyCommand::Teardown(remote) => self.teardown(remote).await,
        }
    }

    pub async fn initiate(&mut self, remote: ParticipantId) {
        // A roster listing the id is authoritative: it is present again.
        self.departed.remove(&remote);
        if self.links.contains_key(&remote) {
            debug!("Link to {} already exists, not initiating", remote);
            return;
        }

        let Some(peer) = self.open_link(remote, LinkRole::Initiator).await else {
            return;
        };

        let offer = peer.link.create_offer().await;
        match offer {
            Ok(sdp) => {
                info!("Offering link {} to {}", peer.link_id, remote);
                self.links.insert(remote, peer);
                self.send_payload(remote, NegotiationPayload::Offer { sdp });
            }
            Err(e) => {
                error!("Failed to create offer for {}: {:#}", remote, e);
                let _ = peer.link.close().await;
            }
        }
    }

    pub fn await_link(&mut self, remote: ParticipantId) {
        self.departed.remove(&remote);
        if !self.links.contains_key(&remote) {
            debug!("Awaiting offer from {}", remote);
            self.awaiting.insert(remote);
        }
    }

    /// Feeds an inbound envelope from `from`.
    ///
    /// An offer from an unknown id opens a responder link; everything else is
    /// routed to the existing link or dropped.
    pub async fn receive_envelope(&mut self, from: ParticipantId, payload: Value) {
        if self.departed.contains(&from) {
            debug!("Dropping envelope from departed {}", from);
            return;
        }

        let payload = match NegotiationPayload::from_value(payload) {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Undecodable envelope from {}: {}", from, e);
                return;
            }
        };

        match payload {
            NegotiationPayload::Offer { sdp } => self.receive_offer(from, sdp).await,

            NegotiationPayload::Answer { sdp } => {
                let Some(peer) = self.links.get(&from) else {
                    debug!("Dropping answer from {}: no link", from);
                    return;
                };
                if peer.role != LinkRole::Initiator {
                    warn!("Dropping answer from {}: link is not an initiator", from);
                    return;
                }
                let applied = peer.link.accept_answer(sdp).await;
                if let Err(e) = applied {
                    error!("Negotiation with {} failed: {:#}", from, e);
                    self.discard(&from).await;
                }
            }

            NegotiationPayload::Candidate {
                candidate,
                sdp_mid,
                sdp_m_line_index,
            } => {
                let Some(peer) = self.links.get(&from) else {
                    debug!("Dropping candidate from {}: no link", from);
                    return;
                };
                if let Err(e) = peer
                    .link
                    .add_candidate(candidate, sdp_mid, sdp_m_line_index)
                    .await
                {
                    warn!("Dropped candidate from {}: {:#}", from, e);
                }
            }
        }
    }

    async fn receive_offer(&mut self, from: ParticipantId, sdp: String) {
        if let Some(existing) = self.links.get(&from) {
            if existing.role == LinkRole::Responder {
                warn!("Ignoring renegotiation offer from {}", from);
                return;
            }
            // Both sides initiated. The lower id keeps the initiator role.
            if self.local < from {
                debug!("Offer glare with {}: keeping initiator role", from);
                return;
            }
            debug!("Offer glare with {}: yielding to remote offer", from);
            self.discard(&from).await;
        }

        self.awaiting.remove(&from);
        let Some(peer) = self.open_link(from, LinkRole::Responder).await else {
            return;
        };

        let answer = peer.link.accept_offer(sdp).await;
        match answer {
            Ok(answer) => {
                info!("Answering link {} from {}", peer.link_id, from);
                self.links.insert(from, peer);
                self.send_payload(from, NegotiationPayload::Answer { sdp: answer });
            }
            Err(e) => {
                error!("Failed to answer offer from {}: {:#}", from, e);
                let _ = peer.link.close().await;
            }
        }
    }

    pub async fn handle_link_event(&mut self, event: LinkEvent) {
        let LinkEvent {
            remote,
            link_id,
            kind,
        } = event;

        let Some(peer) = self.links.get_mut(&remote) else {
            debug!("Event for closed link {} to {}", link_id, remote);
            return;
        };
        if peer.link_id != link_id {
            debug!("Stale event from replaced link {} to {}", link_id, remote);
            return;
        }

        match kind {
            LinkEventKind::Candidate(payload) => self.send_payload(remote, payload),

            LinkEventKind::StateChanged(LinkState::Connected) => {
                info!("Link to {} connected", remote);
                peer.state = LinkState::Connected;
            }

            LinkEventKind::StateChanged(LinkState::Failed) => {
                error!("Link to {} failed, discarding", remote);
                self.discard(&remote).await;
            }

            LinkEventKind::StateChanged(LinkState::Closed) => {
                info!("Link to {} closed by transport", remote);
                self.discard(&remote).await;
            }

            LinkEventKind::StateChanged(LinkState::Negotiating) => {
                peer.state = LinkState::Negotiating;
            }

            LinkEventKind::RemoteTrack(track) => {
                peer.has_media = true;
                let _ = self.media_tx.send(MediaEvent::RemoteTrack { remote, track });
            }
        }
    }

    /// Releases the link to `remote`. A no-op when none exists.
    pub async fn teardown(&mut self, remote: ParticipantId) {
        self.departed.insert(remote);
        self.awaiting.remove(&remote);
        if self.discard(&remote).await {
            info!("Tore down link to {}", remote);
        }
    }

    /// Closes every link. Local media is kept.
    ///
    /// Every remote we were linked to or awaiting counts as departed, so an
    /// envelope already in flight from the old room cannot reopen a link.
    pub async fn close_links(&mut self) {
        for remote in std::mem::take(&mut self.awaiting) {
            self.departed.insert(remote);
        }
        let remotes: Vec<ParticipantId> = self.links.keys().copied().collect();
        for remote in remotes {
            self.departed.insert(remote);
            self.discard(&remote).await;
        }
    }

    /// Closes every link and stops local media.
    pub async fn close_all(&mut self) {
        self.close_links().await;
        if let Some(media) = self.media.take() {
            media.stop();
        }
    }

    pub fn snapshot(&self) -> TopologySnapshot {
        let mut links: Vec<LinkSnapshot> = self
            .links
            .iter()
            .map(|(remote, peer)| LinkSnapshot {
                remote: *remote,
                role: peer.role,
                state: peer.state,
            })
            .collect();
        links.sort_by_key(|link| link.remote);

        let mut awaiting: Vec<ParticipantId> = self.awaiting.iter().copied().collect();
        awaiting.sort();

        TopologySnapshot {
            room: None,
            links,
            awaiting,
        }
    }

    async fn open_link(&mut self, remote: ParticipantId, role: LinkRole) -> Option<PeerLink> {
        let link_id = self.next_link_id;
        self.next_link_id += 1;

        match self
            .factory
            .create(
                remote,
                link_id,
                role,
                self.media.as_ref(),
                self.events_tx.clone(),
            )
            .await
        {
            Ok(link) => Some(PeerLink {
                link_id,
                role,
                state: LinkState::Negotiating,
                link,
                has_media: false,
            }),
            Err(e) => {
                error!("Failed to create link to {}: {:#}", remote, e);
                None
            }
        }
    }

    async fn discard(&mut self, remote: &ParticipantId) -> bool {
        let Some(peer) = self.links.remove(remote) else {
            return false;
        };

        if let Err(e) = peer.link.close().await {
            warn!("Error closing link to {}: {:#}", remote, e);
        }
        if peer.has_media {
            let _ = self.media_tx.send(MediaEvent::RemoteGone { remote: *remote });
        }
        true
    }

    fn send_payload(&self, target: ParticipantId, payload: NegotiationPayload) {
        let payload = match payload.to_value() {
            Ok(value) => value,
            Err(e) => {
                error!("Failed to encode payload for {}: {}", target, e);
                return;
            }
        };

        let msg = SignalMessage::Signal {
            target,
            sender: self.local,
            payload,
        };
        if self.signal_tx.send(msg).is_err() {
            debug!("Signaling channel closed, dropping envelope to {}", target);
        }
    }
}
