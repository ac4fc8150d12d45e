use crate::error::ClientError;
use meshline_core::ParticipantId;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;
use webrtc::api::media_engine::{MIME_TYPE_OPUS, MIME_TYPE_VP8};
use webrtc::rtp_transceiver::rtp_codec::RTCRtpCodecCapability;
use webrtc::track::track_local::track_local_static_sample::TrackLocalStaticSample;
use webrtc::track::track_remote::TrackRemote;

const STREAM_ID: &str = "meshline";

/// Local capture handle. Its tracks are attached to every link created
/// while it is held.
///
/// Sample producers hold a [`CaptureStop`] and must stop writing once it
/// fires. It fires on [`LocalMedia::stop`] and when the handle is dropped.
pub struct LocalMedia {
    tracks: Vec<Arc<TrackLocalStaticSample>>,
    stop_tx: watch::Sender<bool>,
}

impl LocalMedia {
    pub fn new(tracks: Vec<Arc<TrackLocalStaticSample>>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self { tracks, stop_tx }
    }

    /// Receive-only: links are negotiated without local tracks.
    pub fn empty() -> Self {
        Self::new(vec![])
    }

    pub fn tracks(&self) -> &[Arc<TrackLocalStaticSample>] {
        &self.tracks
    }

    pub fn stop_signal(&self) -> CaptureStop {
        CaptureStop {
            rx: self.stop_tx.subscribe(),
        }
    }

    pub fn stop(self) {
        info!("Stopping {} local track(s)", self.tracks.len());
        self.stop_tx.send_replace(true);
    }
}

impl Drop for LocalMedia {
    fn drop(&mut self) {
        self.stop_tx.send_replace(true);
    }
}

/// Observed by whatever feeds samples into the local tracks.
#[derive(Debug, Clone)]
pub struct CaptureStop {
    rx: watch::Receiver<bool>,
}

impl CaptureStop {
    pub fn is_stopped(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolves once capture has been stopped.
    pub async fn stopped(&mut self) {
        // A closed channel means the handle is gone, which also stops capture.
        let _ = self.rx.wait_for(|stopped| *stopped).await;
    }
}

impl fmt::Debug for LocalMedia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalMedia")
            .field("tracks", &self.tracks.len())
            .finish()
    }
}

/// Where local media comes from. Acquisition failures are reported as
/// [`ClientError::MediaUnavailable`] and never end the session.
pub trait MediaSource: Send + Sync {
    fn acquire(&self) -> Result<LocalMedia, ClientError>;
}

/// Produces sample-fed Opus/VP8 tracks. Whatever writes the samples is up
/// to the caller via [`LocalMedia::tracks`] and [`LocalMedia::stop_signal`].
#[derive(Debug, Clone, Copy)]
pub struct SampleSource {
    pub audio: bool,
    pub video: bool,
}

impl Default for SampleSource {
    fn default() -> Self {
        Self {
            audio: true,
            video: true,
        }
    }
}

impl MediaSource for SampleSource {
    fn acquire(&self) -> Result<LocalMedia, ClientError> {
        if !self.audio && !self.video {
            return Err(ClientError::MediaUnavailable(
                "neither audio nor video capture is enabled".to_owned(),
            ));
        }

        let mut tracks = Vec::new();
        if self.audio {
            tracks.push(sample_track(MIME_TYPE_OPUS, "audio"));
        }
        if self.video {
            tracks.push(sample_track(MIME_TYPE_VP8, "video"));
        }
        Ok(LocalMedia::new(tracks))
    }
}

/// Acquires nothing; the client only receives.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMedia;

impl MediaSource for NoMedia {
    fn acquire(&self) -> Result<LocalMedia, ClientError> {
        Ok(LocalMedia::empty())
    }
}

fn sample_track(mime_type: &str, id: &str) -> Arc<TrackLocalStaticSample> {
    Arc::new(TrackLocalStaticSample::new(
        RTCRtpCodecCapability {
            mime_type: mime_type.to_owned(),
            ..Default::default()
        },
        id.to_owned(),
        STREAM_ID.to_owned(),
    ))
}

/// Inbound media changes, for the presentation layer.
pub enum MediaEvent {
    RemoteTrack {
        remote: ParticipantId,
        track: Arc<TrackRemote>,
    },
    RemoteGone {
        remote: ParticipantId,
    },
}

impl fmt::Debug for MediaEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RemoteTrack { remote, .. } => {
                f.debug_struct("RemoteTrack").field("remote", remote).finish()
            }
            Self::RemoteGone { remote } => {
                f.debug_struct("RemoteGone").field("remote", remote).finish()
            }
        }
    }
}
