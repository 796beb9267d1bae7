//! Integration tests for signup, login, logout and session cookies.

use http::StatusCode;
use serde_json::json;

use crate::helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_signup_sets_session_cookies() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/signup",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.body["data"]["username"], "alice");

    let cookies = response.set_cookies();
    let session = cookies
        .iter()
        .find(|c| c.starts_with("session_id="))
        .expect("session cookie set");
    assert!(session.contains("HttpOnly"));
    assert!(cookies.iter().any(|c| c.starts_with("username=alice")));
}

#[tokio::test]
async fn test_signup_duplicate_username() {
    let app = TestApp::new();
    app.signup("alice").await;

    let response = app
        .request(
            "POST",
            "/signup",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["error"], "CONFLICT");
}

#[tokio::test]
async fn test_signup_short_password() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/signup",
            Some(json!({ "username": "alice", "password": "short" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    app.signup("alice").await;

    let response = app
        .request(
            "POST",
            "/login",
            Some(json!({ "username": "alice", "password": "not-the-password" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHENTICATED");
}

#[tokio::test]
async fn test_login_cookie_authenticates_requests() {
    let app = TestApp::new();
    app.signup("alice").await;

    let response = app
        .request(
            "POST",
            "/login",
            Some(json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let token = response.body["data"]["token"].as_str().unwrap().to_string();

    let rooms = app
        .request_with_cookie("GET", "/myrooms", None, &token)
        .await;
    assert_eq!(rooms.status, StatusCode::OK);
    assert_eq!(rooms.body["data"], json!([]));
}

#[tokio::test]
async fn test_logout_invalidates_session() {
    let app = TestApp::new();
    let token = app.signup("alice").await;

    let response = app.request("POST", "/logout", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response
            .set_cookies()
            .iter()
            .any(|c| c.starts_with("session_id="))
    );

    let after = app.request("GET", "/myrooms", None, Some(&token)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_requires_session() {
    let app = TestApp::new();

    let response = app.request("POST", "/logout", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
