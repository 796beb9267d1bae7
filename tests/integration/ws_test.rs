//! Integration tests for the WebSocket room gateway against a live server.

use std::time::Duration;

use http::StatusCode;
use serde_json::json;

use crate::helpers::{
    Handshake, TestApp, authenticate_and_join, expect_silence, next_event, send_event, send_raw,
    ws_connect,
};

async fn room_with_viewer(app: &TestApp) -> (String, String) {
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    let created = app
        .request("POST", "/rooms", Some(json!({ "name": "r1" })), Some(&alice))
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let added = app
        .request(
            "POST",
            "/rooms/r1/addUser",
            Some(json!({ "userId": "bob", "role": "viewer" })),
            Some(&alice),
        )
        .await;
    assert_eq!(added.status, StatusCode::OK);
    (alice, bob)
}

#[tokio::test]
async fn test_editor_viewer_session() {
    let app = TestApp::new();
    let (alice, bob) = room_with_viewer(&app).await;
    let addr = app.spawn_server().await;

    let mut alice_ws = ws_connect(addr, Handshake::Cookie(&alice)).await;
    let mut bob_ws = ws_connect(addr, Handshake::Bearer(&bob)).await;

    let joined = authenticate_and_join(&mut alice_ws, "r1").await;
    assert_eq!(joined["data"]["role"], "editor");
    let joined = authenticate_and_join(&mut bob_ws, "r1").await;
    assert_eq!(joined["data"]["role"], "viewer");

    // A viewer's edit is rejected and never broadcast.
    send_event(&mut bob_ws, json!({ "event": "send-text", "data": "hijack" })).await;
    let denied = next_event(&mut bob_ws).await;
    assert_eq!(denied["event"], "error");
    assert_eq!(denied["data"]["code"], "ACCESS_DENIED");
    expect_silence(&mut alice_ws, Duration::from_millis(200)).await;

    send_event(&mut alice_ws, json!({ "event": "send-text", "data": "x^2" })).await;
    assert_eq!(
        next_event(&mut bob_ws).await,
        json!({ "event": "receive-original", "data": { "text": "x^2", "username": "alice" } })
    );
    assert_eq!(
        next_event(&mut bob_ws).await,
        json!({ "event": "receive-text", "data": { "markup": "x^2" } })
    );

    // Once removed, bob cannot rejoin.
    let removed = app
        .request(
            "POST",
            "/rooms/r1/removeUser",
            Some(json!({ "userId": "bob", "role": "viewer" })),
            Some(&alice),
        )
        .await;
    assert_eq!(removed.status, StatusCode::OK);

    let mut late_ws = ws_connect(addr, Handshake::Cookie(&bob)).await;
    send_event(&mut late_ws, json!({ "event": "authenticate" })).await;
    assert_eq!(next_event(&mut late_ws).await["event"], "authenticated");
    send_event(&mut late_ws, json!({ "event": "join-room", "data": "r1" })).await;
    let denied = next_event(&mut late_ws).await;
    assert_eq!(denied["data"]["code"], "ACCESS_DENIED");
}

#[tokio::test]
async fn test_join_returns_persisted_state() {
    let app = TestApp::new();
    let (alice, bob) = room_with_viewer(&app).await;
    let addr = app.spawn_server().await;

    let mut alice_ws = ws_connect(addr, Handshake::Cookie(&alice)).await;
    let mut bob_ws = ws_connect(addr, Handshake::Cookie(&bob)).await;
    authenticate_and_join(&mut alice_ws, "r1").await;
    authenticate_and_join(&mut bob_ws, "r1").await;

    send_event(&mut alice_ws, json!({ "event": "send-text", "data": "a+b" })).await;
    next_event(&mut bob_ws).await;
    next_event(&mut bob_ws).await;

    // Markup is persisted right after the broadcast; poll the REST view.
    let mut markup = serde_json::Value::Null;
    for _ in 0..50 {
        let detail = app.request("GET", "/rooms/r1", None, Some(&bob)).await;
        markup = detail.body["data"]["markup"].clone();
        if markup == "a+b" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(markup, "a+b");

    let mut fresh = ws_connect(addr, Handshake::Bearer(&bob)).await;
    let joined = authenticate_and_join(&mut fresh, "r1").await;
    assert_eq!(joined["data"]["content"], "a+b");
    assert_eq!(joined["data"]["markup"], "a+b");
}

#[tokio::test]
async fn test_anonymous_socket_cannot_authenticate() {
    let app = TestApp::new();
    let addr = app.spawn_server().await;

    let mut ws = ws_connect(addr, Handshake::Anonymous).await;

    send_event(&mut ws, json!({ "event": "authenticate" })).await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["data"]["code"], "UNAUTHENTICATED");

    send_event(&mut ws, json!({ "event": "join-room", "data": "r1" })).await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["data"]["code"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_malformed_frame_keeps_socket_open() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let addr = app.spawn_server().await;

    let mut ws = ws_connect(addr, Handshake::Cookie(&alice)).await;

    send_raw(&mut ws, "not json").await;
    let error = next_event(&mut ws).await;
    assert_eq!(error["data"]["code"], "INVALID_MESSAGE");
    assert_eq!(error["data"]["retryable"], false);

    send_event(&mut ws, json!({ "event": "authenticate" })).await;
    let ack = next_event(&mut ws).await;
    assert_eq!(ack, json!({ "event": "authenticated", "data": { "username": "alice" } }));
}

#[tokio::test]
async fn test_health_counts_connections() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let addr = app.spawn_server().await;

    let mut ws = ws_connect(addr, Handshake::Cookie(&alice)).await;
    send_event(&mut ws, json!({ "event": "authenticate" })).await;
    next_event(&mut ws).await;

    let health = app.request("GET", "/health", None, None).await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.body["data"]["status"], "ok");
    assert_eq!(health.body["data"]["connections"], 1);
}
