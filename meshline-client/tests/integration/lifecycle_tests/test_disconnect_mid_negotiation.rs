use meshline_client::{ClientConfig, LinkState, NoMedia, connect_with_factory};
use std::sync::Arc;
use std::sync::atomic::Ordering;

use crate::utils::{MockLinkFactory, SETTLE_TIMEOUT_MS, spawn_server, wait_for_topology};

#[tokio::test]
async fn test_disconnect_mid_negotiation_leaves_no_links() {
    let server = spawn_server().await;
    let factory_a = MockLinkFactory::stalled();
    let factory_b = MockLinkFactory::stalled();

    let (a, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(factory_a.clone()),
        Arc::new(NoMedia),
    )
    .await
    .unwrap();
    let (b, _) = connect_with_factory(
        ClientConfig::new(server.ws_url()),
        Arc::new(factory_b.clone()),
        Arc::new(NoMedia),
    )
    .await
    .unwrap();

    a.join("R").await.unwrap();
    wait_for_topology(&a, SETTLE_TIMEOUT_MS, |s| s.room.is_some())
        .await
        .unwrap();
    b.join("R").await.unwrap();

    // Both sides hold a link that never reaches Connected.
    for client in [&a, &b] {
        let snap = wait_for_topology(client, SETTLE_TIMEOUT_MS, |s| s.links.len() == 1)
            .await
            .unwrap();
        assert_eq!(snap.links[0].state, LinkState::Negotiating);
    }

    b.disconnect().await;
    assert_eq!(factory_b.closed.load(Ordering::SeqCst), 1);

    wait_for_topology(&a, SETTLE_TIMEOUT_MS, |s| s.links.is_empty())
        .await
        .unwrap();
    assert_eq!(factory_a.closed.load(Ordering::SeqCst), 1);

    a.disconnect().await;
    server.shutdown();
}
