use meshline_client::{
    ClientConfig, ClientHandle, LinkRole, LinkState, NoMedia, TopologySnapshot,
    connect_with_factory,
};
use meshline_core::ParticipantId;
use std::sync::Arc;

use crate::utils::{MockLinkFactory, SETTLE_TIMEOUT_MS, spawn_server, wait_for_topology};

async fn mock_client(url: &str, factory: &MockLinkFactory) -> ClientHandle {
    let (client, _media) = connect_with_factory(
        ClientConfig::new(url),
        Arc::new(factory.clone()),
        Arc::new(NoMedia),
    )
    .await
    .expect("Failed to connect client");
    client
}

#[tokio::test]
async fn test_three_participants_form_full_mesh() {
    let server = spawn_server().await;
    let factory = MockLinkFactory::connecting();

    let a = mock_client(&server.ws_url(), &factory).await;
    let b = mock_client(&server.ws_url(), &factory).await;
    let c = mock_client(&server.ws_url(), &factory).await;

    a.join("R").await.unwrap();
    wait_for_topology(&a, SETTLE_TIMEOUT_MS, |s| s.room.is_some())
        .await
        .unwrap();
    b.join("R").await.unwrap();
    wait_for_topology(&b, SETTLE_TIMEOUT_MS, |s| s.connected_count() == 1)
        .await
        .unwrap();
    c.join("R").await.unwrap();

    let full = |s: &TopologySnapshot| {
        s.links.len() == 2 && s.connected_count() == 2
    };
    let snap_a = wait_for_topology(&a, SETTLE_TIMEOUT_MS, full).await.unwrap();
    let snap_b = wait_for_topology(&b, SETTLE_TIMEOUT_MS, full).await.unwrap();
    let snap_c = wait_for_topology(&c, SETTLE_TIMEOUT_MS, full).await.unwrap();

    // For every pair the later joiner initiated.
    let role = |snap: &TopologySnapshot, remote: ParticipantId| {
        snap.link(&remote).map(|link| link.role)
    };
    assert_eq!(role(&snap_a, b.participant_id()), Some(LinkRole::Responder));
    assert_eq!(role(&snap_a, c.participant_id()), Some(LinkRole::Responder));
    assert_eq!(role(&snap_b, a.participant_id()), Some(LinkRole::Initiator));
    assert_eq!(role(&snap_b, c.participant_id()), Some(LinkRole::Responder));
    assert_eq!(role(&snap_c, a.participant_id()), Some(LinkRole::Initiator));
    assert_eq!(role(&snap_c, b.participant_id()), Some(LinkRole::Initiator));

    for snap in [&snap_a, &snap_b, &snap_c] {
        assert!(snap.links.iter().all(|l| l.state == LinkState::Connected));
        assert!(snap.awaiting.is_empty());
    }

    a.disconnect().await;
    b.disconnect().await;
    c.disconnect().await;
    server.shutdown();
}

#[tokio::test]
async fn test_departure_shrinks_mesh() {
    let server = spawn_server().await;
    let factory = MockLinkFactory::connecting();

    let a = mock_client(&server.ws_url(), &factory).await;
    let b = mock_client(&server.ws_url(), &factory).await;
    let c = mock_client(&server.ws_url(), &factory).await;

    for client in [&a, &b, &c] {
        client.join("R").await.unwrap();
        wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.room.is_some())
            .await
            .unwrap();
    }
    for client in [&a, &b, &c] {
        wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.connected_count() == 2)
            .await
            .unwrap();
    }

    let c_id = c.participant_id();
    c.disconnect().await;

    for client in [&a, &b] {
        let snap = wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.links.len() == 1)
            .await
            .unwrap();
        assert!(snap.link(&c_id).is_none());
    }

    a.disconnect().await;
    b.disconnect().await;
    server.shutdown();
}
