use meshline_client::{ClientConfig, LinkRole, NoMedia, connect};
use std::sync::Arc;

use crate::utils::{CONNECTION_TIMEOUT_MS, spawn_server, wait_for_topology};

#[tokio::test]
async fn test_two_clients_connect_over_webrtc() {
    let server = spawn_server().await;

    let (a, _) = connect(ClientConfig::new(server.ws_url()), Arc::new(NoMedia))
        .await
        .expect("Failed to connect a");
    let (b, _) = connect(ClientConfig::new(server.ws_url()), Arc::new(NoMedia))
        .await
        .expect("Failed to connect b");

    a.join("loopback").await.unwrap();
    wait_for_topology(&a, CONNECTION_TIMEOUT_MS, |s| s.room.is_some())
        .await
        .unwrap();
    b.join("loopback").await.unwrap();

    let snap_b = wait_for_topology(&b, CONNECTION_TIMEOUT_MS, |s| s.connected_count() == 1)
        .await
        .expect("b never connected");
    let snap_a = wait_for_topology(&a, CONNECTION_TIMEOUT_MS, |s| s.connected_count() == 1)
        .await
        .expect("a never connected");

    assert_eq!(
        snap_b.link(&a.participant_id()).map(|l| l.role),
        Some(LinkRole::Initiator)
    );
    assert_eq!(
        snap_a.link(&b.participant_id()).map(|l| l.role),
        Some(LinkRole::Responder)
    );

    b.disconnect().await;
    wait_for_topology(&a, CONNECTION_TIMEOUT_MS, |s| s.links.is_empty())
        .await
        .unwrap();

    a.disconnect().await;
    server.shutdown();
}
