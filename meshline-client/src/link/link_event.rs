use crate::link::LinkState;
use meshline_core::{NegotiationPayload, ParticipantId};
use std::fmt;
use std::sync::Arc;
use webrtc::track::track_remote::TrackRemote;

#[derive(Debug)]
pub struct LinkEvent {
    pub remote: ParticipantId,
    pub link_id: u64,
    pub kind: LinkEventKind,
}

pub enum LinkEventKind {
    /// A locally gathered candidate, ready to be relayed to the remote.
    Candidate(NegotiationPayload),
    StateChanged(LinkState),
    RemoteTrack(Arc<TrackRemote>),
}

impl fmt::Debug for LinkEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Candidate(payload) => f.debug_tuple("Candidate").field(payload).finish(),
            Self::StateChanged(state) => f.debug_tuple("StateChanged").field(state).finish(),
            Self::RemoteTrack(_) => f.write_str("RemoteTrack(..)"),
        }
    }
}
