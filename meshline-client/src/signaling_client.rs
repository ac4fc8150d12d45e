use crate::error::ClientError;
use futures::{SinkExt, Stream, StreamExt};
use meshline_core::{IceServerConfig, ParticipantId, SignalMessage};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, error, info, warn};

const GREETING_TIMEOUT: Duration = Duration::from_secs(10);

/// An open signaling socket, already past the greeting.
pub struct SignalingConnection {
    pub participant_id: ParticipantId,
    pub ice_servers: Vec<IceServerConfig>,
    pub inbound_rx: mpsc::UnboundedReceiver<SignalMessage>,
    pub outbound_tx: mpsc::UnboundedSender<SignalMessage>,
}

/// Connects to the server and waits for `welcome` and `ice_config`.
///
/// Once connected, a reader task feeds `inbound_rx` and a writer task drains
/// `outbound_tx`. Dropping every outbound sender closes the socket.
pub async fn connect_signaling(url: &str) -> Result<SignalingConnection, ClientError> {
    let (ws, _) = connect_async(url).await?;
    let (mut sink, mut stream) = ws.split();

    let (participant_id, ice_servers) =
        tokio::time::timeout(GREETING_TIMEOUT, read_greeting(&mut stream))
            .await
            .map_err(|_| ClientError::Handshake("timed out waiting for welcome".to_owned()))??;

    info!("Connected to {} as {}", url, participant_id);

    let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<SignalMessage>();

    tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(e) => {
                    error!("Failed to serialize SignalMessage: {}", e);
                    continue;
                }
            };
            if sink.send(Message::Text(json.into())).await.is_err() {
                break;
            }
        }
        let _ = sink.close().await;
        debug!("Signaling writer finished");
    });

    tokio::spawn(async move {
        while let Some(Ok(frame)) = stream.next().await {
            match frame {
                Message::Text(text) => match serde_json::from_str::<SignalMessage>(text.as_str()) {
                    Ok(msg) => {
                        if inbound_tx.send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("Invalid SignalMessage from server: {}", e),
                },
                Message::Close(_) => break,
                _ => {}
            }
        }
        debug!("Signaling reader finished");
    });

    Ok(SignalingConnection {
        participant_id,
        ice_servers,
        inbound_rx,
        outbound_tx,
    })
}

async fn read_greeting<S>(stream: &mut S) -> Result<(ParticipantId, Vec<IceServerConfig>), ClientError>
where
    S: Stream<Item = Result<Message, tungstenite::Error>> + Unpin,
{
    let mut participant_id = None;

    while let Some(frame) = stream.next().await {
        let text = match frame? {
            Message::Text(text) => text,
            Message::Close(_) => break,
            _ => continue,
        };

        match serde_json::from_str::<SignalMessage>(text.as_str()) {
            Ok(SignalMessage::Welcome { participant_id: id }) => participant_id = Some(id),
            Ok(SignalMessage::IceConfig { ice_servers }) => {
                return participant_id.map(|id| (id, ice_servers)).ok_or_else(|| {
                    ClientError::Handshake("ice_config arrived before welcome".to_owned())
                });
            }
            Ok(other) => warn!("Unexpected frame during greeting: {:?}", other),
            Err(e) => warn!("Invalid SignalMessage during greeting: {}", e),
        }
    }

    Err(ClientError::Handshake(
        "connection closed during greeting".to_owned(),
    ))
}
