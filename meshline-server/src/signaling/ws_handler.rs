use crate::session::SessionCommand;
use crate::signaling::SignalingService;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt};
use meshline_core::{ParticipantId, SignalMessage};
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(service): State<SignalingService>,
) -> impl IntoResponse {
    let participant_id = ParticipantId::new();

    ws.on_upgrade(move |socket| handle_socket(socket, participant_id, service))
}

async fn handle_socket(socket: WebSocket, participant_id: ParticipantId, service: SignalingService) {
    info!("New WebSocket connection: {}", participant_id);

    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::unbounded_channel();

    service.add_peer(participant_id, tx);
    service.send_signal(participant_id, SignalMessage::Welcome { participant_id });
    service.send_signal(
        participant_id,
        SignalMessage::IceConfig {
            ice_servers: service.get_ice_servers(),
        },
    );

    let mut send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            if sender.send(msg).await.is_err() {
                break;
            }
        }
    });

    let mut recv_task = tokio::spawn({
        let service = service.clone();

        async move {
            while let Some(Ok(msg)) = receiver.next().await {
                match msg {
                    Message::Text(text) => {
                        match serde_json::from_str::<SignalMessage>(text.as_str()) {
                            Ok(signal) => {
                                if !dispatch(&service, participant_id, signal).await {
                                    break;
                                }
                            }
                            Err(e) => {
                                warn!("Invalid SignalMessage from {}: {}", participant_id, e)
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => recv_task.abort(),
        _ = (&mut recv_task) => send_task.abort(),
    };

    let _ = service
        .session_tx
        .send(SessionCommand::Disconnect { participant_id })
        .await;
    service.remove_peer(&participant_id);
    info!("WebSocket disconnected: {}", participant_id);
}

/// Routes one inbound frame. Returns `false` once the coordinator is gone.
async fn dispatch(service: &SignalingService, participant_id: ParticipantId, signal: SignalMessage) -> bool {
    let cmd = match signal {
        SignalMessage::Join { room } => SessionCommand::Join {
            participant_id,
            room,
        },
        SignalMessage::Leave => SessionCommand::Leave { participant_id },
        SignalMessage::Signal {
            target, payload, ..
        } => {
            // The claimed sender is replaced with the connection's own id.
            service.relay(participant_id, target, payload);
            return true;
        }
        other => {
            debug!(
                "Ignoring server-only message from {}: {:?}",
                participant_id, other
            );
            return true;
        }
    };

    if let Err(e) = service.session_tx.send(cmd).await {
        error!("Session coordinator died: {}", e);
        return false;
    }
    true
}
