mod link_event;
mod rtc_link;

pub use link_event::*;
pub use rtc_link::*;

use crate::media::LocalMedia;
use async_trait::async_trait;
use meshline_core::ParticipantId;
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkRole {
    Initiator,
    Responder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Negotiating,
    Connected,
    Failed,
    Closed,
}

/// One direct connection to a remote participant, seen from the
/// negotiation side only.
#[async_trait]
pub trait NegotiatedLink: Send + Sync {
    /// Initiator side. Returns the local offer SDP.
    async fn create_offer(&self) -> anyhow::Result<String>;

    /// Responder side. Applies the remote offer and returns the answer SDP.
    async fn accept_offer(&self, sdp: String) -> anyhow::Result<String>;

    async fn accept_answer(&self, sdp: String) -> anyhow::Result<()>;

    async fn add_candidate(
        &self,
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    ) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}

/// Builds links. Every event the link produces is tagged with `link_id` and
/// pushed to `events`.
#[async_trait]
pub trait LinkFactory: Send + Sync {
    async fn create(
        &self,
        remote: ParticipantId,
        link_id: u64,
        role: LinkRole,
        media: Option<&LocalMedia>,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> anyhow::Result<Box<dyn NegotiatedLink>>;
}
