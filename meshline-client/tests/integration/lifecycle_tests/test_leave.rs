use meshline_client::{
    ClientConfig, ClientError, NoMedia, SampleSource, connect_with_factory,
};
use std::sync::Arc;

use crate::utils::{MockLinkFactory, SETTLE_TIMEOUT_MS, spawn_server, wait_for_topology};

#[tokio::test]
async fn test_leave_closes_links_and_allows_rejoin() {
    let server = spawn_server().await;
    let factory = MockLinkFactory::connecting();

    let (a, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(factory.clone()),
        Arc::new(NoMedia),
    )
    .await
    .unwrap();
    let (b, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(factory.clone()),
        Arc::new(NoMedia),
    )
    .await
    .unwrap();

    a.join("R").await.unwrap();
    wait_for_topology(&a, SETTLE_TIMEOUT_MS, |s| s.room.is_some())
        .await
        .unwrap();
    b.join("R").await.unwrap();
    for client in [&a, &b] {
        wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.connected_count() == 1)
            .await
            .unwrap();
    }

    b.leave().await.unwrap();
    assert!(b.snapshot().await.unwrap().links.is_empty());
    wait_for_topology(&a, SETTLE_TIMEOUT_MS, |s| s.links.is_empty())
        .await
        .unwrap();

    // Same connection, same id: the room accepts it again.
    b.join("R").await.unwrap();
    for client in [&a, &b] {
        wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.connected_count() == 1)
            .await
            .unwrap();
    }

    a.disconnect().await;
    b.disconnect().await;
    server.shutdown();
}

#[tokio::test]
async fn test_media_failure_is_recoverable() {
    let server = spawn_server().await;

    let (client, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(MockLinkFactory::connecting()),
        Arc::new(SampleSource {
            audio: false,
            video: false,
        }),
    )
    .await
    .unwrap();

    let err = client.join("R").await.unwrap_err();
    assert!(matches!(err, ClientError::MediaUnavailable(_)));
    assert!(err.to_string().contains("local media unavailable"));

    // The session survives and still answers.
    assert!(client.snapshot().await.unwrap().links.is_empty());
    assert!(!client.is_finished());

    client.disconnect().await;
    server.shutdown();
}

#[tokio::test]
async fn test_blank_room_rejected_locally() {
    let server = spawn_server().await;
    let (client, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(MockLinkFactory::connecting()),
        Arc::new(NoMedia),
    )
    .await
    .unwrap();

    assert!(matches!(
        client.join("  ").await,
        Err(ClientError::Core(_))
    ));

    client.disconnect().await;
    server.shutdown();
}
