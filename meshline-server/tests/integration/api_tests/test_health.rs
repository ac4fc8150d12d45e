use axum::body::Body;
use axum::http::{Request, StatusCode};

use super::{call, test_app};
use crate::utils::{WsClient, spawn_test_server};

#[tokio::test]
async fn test_health_reports_ok() {
    let request = Request::get("/api/health").body(Body::empty()).unwrap();
    let (status, body) = call(test_app(), request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "meshline-server");
    assert_eq!(body["rooms"], 0);
    assert_eq!(body["participants"], 0);
}

#[tokio::test]
async fn test_health_counts_rooms_over_http() {
    let server = spawn_test_server().await;
    let mut a = WsClient::connect(&server.ws_url()).await.unwrap();
    a.join("R").await.unwrap();
    a.recv_roster().await.unwrap();

    let body = fetch_health(&server.http_url("/api/health")).await;
    assert_eq!(body["rooms"], 1);
    assert_eq!(body["participants"], 1);
    assert_eq!(body["connections"], 1);

    server.shutdown();
}

async fn fetch_health(url: &str) -> serde_json::Value {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let authority = url
        .trim_start_matches("http://")
        .split('/')
        .next()
        .unwrap()
        .to_owned();
    let mut stream = tokio::net::TcpStream::connect(&authority).await.unwrap();
    let request = format!(
        "GET /api/health HTTP/1.1\r\nHost: {}\r\nConnection: close\r\n\r\n",
        authority
    );
    stream.write_all(request.as_bytes()).await.unwrap();

    let mut raw = String::new();
    stream.read_to_string(&mut raw).await.unwrap();
    let body = raw.split("\r\n\r\n").nth(1).unwrap();
    serde_json::from_str(body.trim()).unwrap()
}
