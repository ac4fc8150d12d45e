use axum::http::StatusCode;
use serde_json::json;

use super::{call, post, test_app, test_app_with_limit};

#[tokio::test]
async fn test_chat_echoes_trimmed_message() {
    let body = json!({"message": "  hi there  "}).to_string();
    let (status, body) = call(test_app(), post("/api/chat", "application/json", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], "You said: hi there");
}

#[tokio::test]
async fn test_chat_requires_message() {
    for payload in [json!({}), json!({"message": "   "})] {
        let request = post("/api/chat", "application/json", payload.to_string());
        let (status, body) = call(test_app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "message is required");
    }
}

#[tokio::test]
async fn test_chat_rejects_invalid_json() {
    let request = post("/api/chat", "application/json", "{not json");
    let (status, body) = call(test_app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_chat_rejects_long_message() {
    let long = "x".repeat(4097);
    let request = post("/api/chat", "application/json", json!({"message": long}).to_string());
    let (status, body) = call(test_app_with_limit(64 * 1024), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "message is longer than 4096 characters");
}
