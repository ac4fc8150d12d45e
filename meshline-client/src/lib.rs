pub mod config;
pub mod error;
pub mod link;
pub mod media;
pub mod roster;
pub mod session;
pub mod signaling_client;
pub mod topology;

pub use config::ClientConfig;
pub use error::ClientError;
pub use link::{LinkEvent, LinkEventKind, LinkFactory, LinkRole, LinkState, NegotiatedLink, RtcLinkFactory};
pub use media::{CaptureStop, LocalMedia, MediaEvent, MediaSource, NoMedia, SampleSource};
pub use roster::{RosterConsumer, TopologyCommand};
pub use session::{ClientCommand, ClientHandle, ClientSession};
pub use topology::{LinkSnapshot, TopologyManager, TopologySnapshot};

use std::sync::Arc;
use tokio::sync::mpsc;

const COMMAND_QUEUE: usize = 32;

/// Connects with WebRTC links.
pub async fn connect(
    config: ClientConfig,
    media_source: Arc<dyn MediaSource>,
) -> Result<(ClientHandle, mpsc::UnboundedReceiver<MediaEvent>), ClientError> {
    let connection = signaling_client::connect_signaling(&config.server_url).await?;
    let ice_servers = config.resolve_ice_servers(connection.ice_servers.clone());
    let factory = RtcLinkFactory::new(&ice_servers)
        .map_err(|e| ClientError::WebRtc(format!("{:#}", e)))?;

    Ok(start(connection, Arc::new(factory), media_source))
}

/// Connects with a caller-supplied link implementation.
pub async fn connect_with_factory(
    config: ClientConfig,
    factory: Arc<dyn LinkFactory>,
    media_source: Arc<dyn MediaSource>,
) -> Result<(ClientHandle, mpsc::UnboundedReceiver<MediaEvent>), ClientError> {
    let connection = signaling_client::connect_signaling(&config.server_url).await?;
    Ok(start(connection, factory, media_source))
}

fn start(
    connection: signaling_client::SignalingConnection,
    factory: Arc<dyn LinkFactory>,
    media_source: Arc<dyn MediaSource>,
) -> (ClientHandle, mpsc::UnboundedReceiver<MediaEvent>) {
    let (command_tx, command_rx) = mpsc::channel(COMMAND_QUEUE);
    let (media_tx, media_rx) = mpsc::unbounded_channel();

    let session = ClientSession::new(connection, factory, media_source, command_rx, media_tx);
    (ClientHandle::spawn(session, command_tx), media_rx)
}
