use crate::utils::{WsClient, spawn_test_server};

#[tokio::test]
async fn test_each_connection_gets_distinct_id() {
    let server = spawn_test_server().await;

    let a = WsClient::connect(&server.ws_url()).await.unwrap();
    let b = WsClient::connect(&server.ws_url()).await.unwrap();

    assert_ne!(a.participant_id, b.participant_id);
    assert!(a.ice_servers.is_empty());

    server.shutdown();
}

#[tokio::test]
async fn test_malformed_frames_are_ignored() {
    let server = spawn_test_server().await;
    let mut client = WsClient::connect(&server.ws_url()).await.unwrap();

    client.send_raw("not json".to_owned()).await.unwrap();
    client
        .send_raw(r#"{"op":"join","d":{"room":"   "}}"#.to_owned())
        .await
        .unwrap();
    assert!(client.is_silent().await);

    // The socket is still usable afterwards.
    client.join("lobby").await.unwrap();
    assert!(client.recv_roster().await.unwrap().is_empty());

    server.shutdown();
}
