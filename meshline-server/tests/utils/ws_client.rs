use anyhow::{Context, Result, bail};
use futures::{SinkExt, StreamExt};
use meshline_core::{IceServerConfig, ParticipantId, RoomId, SignalMessage};
use serde_json::Value;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Timeout for a single expected frame.
pub const RECV_TIMEOUT_MS: u64 = 5000;

/// Window used to assert that nothing arrives.
pub const SILENCE_MS: u64 = 300;

/// Raw signaling socket speaking the JSON wire format.
pub struct WsClient {
    pub participant_id: ParticipantId,
    pub ice_servers: Vec<IceServerConfig>,
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connects and consumes the `welcome` and `ice_config` greeting.
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _) = connect_async(url)
            .await
            .context("Failed to open WebSocket")?;

        let mut client = Self {
            participant_id: ParticipantId::new(),
            ice_servers: vec![],
            stream,
        };

        match client.recv().await? {
            SignalMessage::Welcome { participant_id } => client.participant_id = participant_id,
            other => bail!("Expected welcome, got {:?}", other),
        }
        match client.recv().await? {
            SignalMessage::IceConfig { ice_servers } => client.ice_servers = ice_servers,
            other => bail!("Expected ice_config, got {:?}", other),
        }

        Ok(client)
    }

    pub async fn send(&mut self, msg: &SignalMessage) -> Result<()> {
        let json = serde_json::to_string(msg)?;
        self.send_raw(json).await
    }

    pub async fn send_raw(&mut self, text: String) -> Result<()> {
        self.stream
            .send(Message::Text(text.into()))
            .await
            .context("Failed to send frame")
    }

    pub async fn join(&mut self, room: &str) -> Result<()> {
        self.send(&SignalMessage::Join {
            room: RoomId::new(room)?,
        })
        .await
    }

    pub async fn leave(&mut self) -> Result<()> {
        self.send(&SignalMessage::Leave).await
    }

    pub async fn signal(&mut self, target: ParticipantId, payload: Value) -> Result<()> {
        self.send(&SignalMessage::Signal {
            target,
            sender: self.participant_id,
            payload,
        })
        .await
    }

    /// Next signaling frame, skipping control frames.
    pub async fn recv(&mut self) -> Result<SignalMessage> {
        let deadline = Duration::from_millis(RECV_TIMEOUT_MS);

        loop {
            let frame = tokio::time::timeout(deadline, self.stream.next())
                .await
                .context("Timeout waiting for frame")?;

            match frame {
                Some(Ok(Message::Text(text))) => {
                    return serde_json::from_str(text.as_str()).context("Malformed frame");
                }
                Some(Ok(Message::Close(_))) | None => bail!("Connection closed"),
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(e.into()),
            }
        }
    }

    pub async fn recv_roster(&mut self) -> Result<Vec<ParticipantId>> {
        match self.recv().await? {
            SignalMessage::Roster { participants } => Ok(participants),
            other => bail!("Expected roster, got {:?}", other),
        }
    }

    /// Returns `true` if no frame arrives within [`SILENCE_MS`].
    pub async fn is_silent(&mut self) -> bool {
        tokio::time::timeout(Duration::from_millis(SILENCE_MS), self.stream.next())
            .await
            .is_err()
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}
