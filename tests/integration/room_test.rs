//! Integration tests for room creation, listings and membership.

use http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

async fn create_room(app: &TestApp, token: &str, name: &str) {
    let response = app
        .request("POST", "/rooms", Some(json!({ "name": name })), Some(token))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
}

async fn change_member(
    app: &TestApp,
    token: &str,
    room: &str,
    action: &str,
    user: &str,
    role: &str,
) -> StatusCode {
    app.request(
        "POST",
        &format!("/rooms/{room}/{action}"),
        Some(json!({ "userId": user, "role": role })),
        Some(token),
    )
    .await
    .status
}

#[tokio::test]
async fn test_create_room_lists_creator_as_editor() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    create_room(&app, &alice, "r1").await;

    let mine = app.request("GET", "/myrooms", None, Some(&alice)).await;
    assert_eq!(mine.status, StatusCode::OK);
    let rooms = mine.body["data"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["name"], "r1");
    assert_eq!(rooms[0]["role"], "editor");
    assert_eq!(rooms[0]["is_creator"], true);

    let detail = app.request("GET", "/rooms/r1", None, Some(&alice)).await;
    assert_eq!(detail.body["data"]["editors"], json!(["alice"]));
    assert_eq!(detail.body["data"]["viewers"], json!([]));
}

#[tokio::test]
async fn test_create_room_conflicts_and_validation() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    create_room(&app, &alice, "r1").await;

    let duplicate = app
        .request("POST", "/rooms", Some(json!({ "name": "r1" })), Some(&alice))
        .await;
    assert_eq!(duplicate.status, StatusCode::CONFLICT);

    let invalid = app
        .request(
            "POST",
            "/rooms",
            Some(json!({ "name": "no spaces!" })),
            Some(&alice),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_viewer_membership_round_trip() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    create_room(&app, &alice, "r1").await;

    assert_eq!(
        change_member(&app, &alice, "r1", "addUser", "bob", "viewer").await,
        StatusCode::OK
    );
    assert_eq!(
        change_member(&app, &alice, "r1", "addUser", "bob", "viewer").await,
        StatusCode::OK
    );

    let viewable = app.request("GET", "/viewablerooms", None, Some(&bob)).await;
    let rooms = viewable.body["data"].as_array().unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["role"], "viewer");

    let role = app.request("GET", "/rooms/r1/role", None, Some(&bob)).await;
    assert_eq!(role.body["data"]["role"], "viewer");

    let detail = app.request("GET", "/rooms/r1", None, Some(&alice)).await;
    assert_eq!(detail.body["data"]["viewers"], json!(["bob"]));

    assert_eq!(
        change_member(&app, &alice, "r1", "removeUser", "bob", "viewer").await,
        StatusCode::OK
    );

    let viewable = app.request("GET", "/viewablerooms", None, Some(&bob)).await;
    assert_eq!(viewable.body["data"], json!([]));
    let role = app.request("GET", "/rooms/r1/role", None, Some(&bob)).await;
    assert_eq!(role.body["data"]["role"], "none");
    let detail = app.request("GET", "/rooms/r1", None, Some(&bob)).await;
    assert_eq!(detail.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_viewer_sees_only_self() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.signup("carol").await;
    create_room(&app, &alice, "r1").await;
    change_member(&app, &alice, "r1", "addUser", "bob", "viewer").await;
    change_member(&app, &alice, "r1", "addUser", "carol", "viewer").await;

    let detail = app.request("GET", "/rooms/r1", None, Some(&bob)).await;

    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["data"]["viewers"], json!(["bob"]));
    assert_eq!(detail.body["data"]["role"], "viewer");
}

#[tokio::test]
async fn test_membership_rules() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    app.signup("carol").await;
    create_room(&app, &alice, "r1").await;
    change_member(&app, &alice, "r1", "addUser", "bob", "viewer").await;

    // Only the creator adds members.
    assert_eq!(
        change_member(&app, &bob, "r1", "addUser", "carol", "viewer").await,
        StatusCode::FORBIDDEN
    );
    // Editor and viewer lists stay disjoint.
    assert_eq!(
        change_member(&app, &alice, "r1", "addUser", "bob", "editor").await,
        StatusCode::CONFLICT
    );
    assert_eq!(
        change_member(&app, &alice, "r1", "addUser", "nobody", "viewer").await,
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        change_member(&app, &alice, "r1", "removeUser", "alice", "editor").await,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        change_member(&app, &alice, "r9", "addUser", "bob", "viewer").await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_added_editor_lists_room_as_mine() {
    let app = TestApp::new();
    let alice = app.signup("alice").await;
    let bob = app.signup("bob").await;
    create_room(&app, &alice, "r1").await;
    change_member(&app, &alice, "r1", "addUser", "bob", "editor").await;

    let mine = app.request("GET", "/myrooms", None, Some(&bob)).await;
    let rooms = mine.body["data"].as_array().unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0]["role"], "editor");
    assert_eq!(rooms[0]["is_creator"], false);
}
