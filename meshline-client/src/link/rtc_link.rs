use crate::link::{LinkEvent, LinkEventKind, LinkFactory, LinkRole, LinkState, NegotiatedLink};
use crate::media::LocalMedia;
use anyhow::{Context, Result};
use async_trait::async_trait;
use meshline_core::{IceServerConfig, NegotiationPayload, ParticipantId};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, warn};
use webrtc::api::API;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::data_channel::RTCDataChannel;
use webrtc::ice_transport::ice_candidate::RTCIceCandidateInit;
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;
use webrtc::track::track_local::TrackLocal;

const DATA_CHANNEL_LABEL: &str = "mesh";

/// [`LinkFactory`] backed by `RTCPeerConnection`.
pub struct RtcLinkFactory {
    api: API,
    ice_servers: Vec<RTCIceServer>,
}

impl RtcLinkFactory {
    pub fn new(ice_servers: &[IceServerConfig]) -> Result<Self> {
        let mut media_engine = MediaEngine::default();
        media_engine.register_default_codecs()?;

        let registry = register_default_interceptors(Registry::new(), &mut media_engine)?;

        let api = APIBuilder::new()
            .with_media_engine(media_engine)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = ice_servers
            .iter()
            .map(|server| RTCIceServer {
                urls: server.urls.clone(),
                username: server.username.clone().unwrap_or_default(),
                credential: server.credential.clone().unwrap_or_default(),
                ..Default::default()
            })
            .collect();

        Ok(Self { api, ice_servers })
    }
}

#[async_trait]
impl LinkFactory for RtcLinkFactory {
    async fn create(
        &self,
        remote: ParticipantId,
        link_id: u64,
        role: LinkRole,
        media: Option<&LocalMedia>,
        events: mpsc::UnboundedSender<LinkEvent>,
    ) -> Result<Box<dyn NegotiatedLink>> {
        debug!("Creating {:?} link {} to {}", role, link_id, remote);

        let rtc_config = RTCConfiguration {
            ice_servers: self.ice_servers.clone(),
            ..Default::default()
        };

        let pc = Arc::new(
            self.api
                .new_peer_connection(rtc_config)
                .await
                .context("Failed to create peer connection")?,
        );

        let emit = move |kind: LinkEventKind| {
            let _ = events.send(LinkEvent {
                remote,
                link_id,
                kind,
            });
        };

        let on_candidate = emit.clone();
        pc.on_ice_candidate(Box::new(move |candidate| {
            let emit = on_candidate.clone();
            Box::pin(async move {
                let Some(candidate) = candidate else {
                    return;
                };
                match candidate.to_json() {
                    Ok(init) => emit(LinkEventKind::Candidate(NegotiationPayload::Candidate {
                        candidate: init.candidate,
                        sdp_mid: init.sdp_mid,
                        sdp_m_line_index: init.sdp_mline_index,
                    })),
                    Err(e) => warn!("Failed to serialize ICE candidate for {}: {}", remote, e),
                }
            })
        }));

        let on_state = emit.clone();
        pc.on_peer_connection_state_change(Box::new(move |state| {
            let emit = on_state.clone();
            Box::pin(async move {
                debug!("Link {} to {} is {:?}", link_id, remote, state);
                let mapped = match state {
                    RTCPeerConnectionState::Connected => LinkState::Connected,
                    RTCPeerConnectionState::Failed => LinkState::Failed,
                    RTCPeerConnectionState::Closed => LinkState::Closed,
                    _ => return,
                };
                emit(LinkEventKind::StateChanged(mapped));
            })
        }));

        let on_track = emit;
        pc.on_track(Box::new(move |track, _receiver, _transceiver| {
            let emit = on_track.clone();
            Box::pin(async move {
                emit(LinkEventKind::RemoteTrack(track));
            })
        }));

        if let Some(media) = media {
            attach_or_close(&pc, media)
                .await
                .with_context(|| format!("Link {} to {} refused local media", link_id, remote))?;
        }

        Ok(Box::new(RtcLink {
            pc,
            data_channel: Mutex::new(None),
        }))
    }
}

/// Attaches the local tracks. A refused track closes `pc`, which is never
/// handed out afterwards.
async fn attach_or_close(pc: &RTCPeerConnection, media: &LocalMedia) -> Result<()> {
    let mut attached = Ok(());
    for track in media.tracks() {
        let added = pc
            .add_track(Arc::clone(track) as Arc<dyn TrackLocal + Send + Sync>)
            .await;
        if let Err(e) = added {
            attached = Err(anyhow::Error::new(e).context("Failed to attach local track"));
            break;
        }
    }

    if attached.is_err() {
        if let Err(e) = pc.close().await {
            warn!("Failed to close refused peer connection: {}", e);
        }
    }
    attached
}

struct RtcLink {
    pc: Arc<RTCPeerConnection>,
    /// Held so the initiator's channel outlives negotiation.
    data_channel: Mutex<Option<Arc<RTCDataChannel>>>,
}

#[async_trait]
impl NegotiatedLink for RtcLink {
    async fn create_offer(&self) -> Result<String> {
        let dc = self
            .pc
            .create_data_channel(DATA_CHANNEL_LABEL, None)
            .await
            .context("Failed to create data channel")?;
        *self.data_channel.lock().await = Some(dc);

        let offer = self
            .pc
            .create_offer(None)
            .await
            .context("Failed to create offer")?;

        self.pc
            .set_local_description(offer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(offer.sdp)
    }

    async fn accept_offer(&self, sdp: String) -> Result<String> {
        let offer = RTCSessionDescription::offer(sdp)?;
        self.pc
            .set_remote_description(offer)
            .await
            .context("Failed to set remote offer")?;

        let answer = self
            .pc
            .create_answer(None)
            .await
            .context("Failed to create answer")?;

        self.pc
            .set_local_description(answer.clone())
            .await
            .context("Failed to set local description")?;

        Ok(answer.sdp)
    }

    async fn accept_answer(&self, sdp: String) -> Result<()> {
        let answer = RTCSessionDescription::answer(sdp)?;
        self.pc
            .set_remote_description(answer)
            .await
            .context("Failed to set remote answer")?;
        Ok(())
    }

    async fn add_candidate(
        &self,
        candidate: String,
        sdp_mid: Option<String>,
        sdp_m_line_index: Option<u16>,
    ) -> Result<()> {
        self.pc
            .add_ice_candidate(RTCIceCandidateInit {
                candidate,
                sdp_mid,
                sdp_mline_index: sdp_m_line_index,
                username_fragment: None,
            })
            .await
            .context("Failed to add ICE candidate")?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.pc
            .close()
            .await
            .context("Failed to close peer connection")?;
        Ok(())
    }
}
