use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{Notify, mpsc};

use texroom_auth::session::SessionManager;
use texroom_core::config::auth::AuthConfig;
use texroom_core::config::realtime::RealtimeConfig;
use texroom_core::config::session::SessionConfig;
use texroom_core::error::AppError;
use texroom_core::result::AppResult;
use texroom_database::store::Stores;
use texroom_entity::room::RoomRole;
use texroom_entity::user::Identity;
use texroom_service::conversion::Converter;
use texroom_service::room::RoomService;

use super::*;

#[derive(Debug, Default)]
struct ScriptedConverter {
    fail: AtomicBool,
    gates: DashMap<String, Arc<Notify>>,
}

impl ScriptedConverter {
    /// Holds conversions of `text` until the returned gate is notified.
    fn gate(&self, text: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates.insert(text.to_string(), Arc::clone(&gate));
        gate
    }
}

#[async_trait]
impl Converter for ScriptedConverter {
    async fn convert(&self, text: &str) -> AppResult<String> {
        let gate = self.gates.get(text).map(|g| Arc::clone(g.value()));
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(AppError::upstream("converter unavailable"));
        }
        Ok(format!("\\({text}\\)"))
    }
}

struct Fixture {
    gateway: RoomGateway,
    sessions: SessionManager,
    rooms: RoomService,
    converter: Arc<ScriptedConverter>,
    stores: Stores,
    alice: Identity,
    alice_token: String,
    bob_token: String,
}

async fn fixture() -> Fixture {
    let stores = Stores::memory();
    let sessions = SessionManager::new(&stores, &AuthConfig::default(), &SessionConfig::default());
    let alice = sessions.signup("alice", "password1").await.unwrap();
    let bob = sessions.signup("bob", "password1").await.unwrap();
    sessions.signup("mallory", "password1").await.unwrap();

    let rooms = RoomService::new(&stores);
    let alice_identity = alice.user.identity();
    rooms.create_room(&alice_identity, "r1").await.unwrap();
    rooms
        .add_member(&alice_identity, "r1", "bob", RoomRole::Viewer)
        .await
        .unwrap();

    let converter = Arc::new(ScriptedConverter::default());
    let gateway = RoomGateway::new(
        RealtimeConfig::default(),
        Arc::new(sessions.clone()),
        Arc::clone(&stores.rooms),
        converter.clone(),
    );

    Fixture {
        gateway,
        sessions,
        rooms,
        converter,
        stores,
        alice: alice_identity,
        alice_token: alice.token,
        bob_token: bob.token,
    }
}

async fn next(rx: &mut mpsc::Receiver<OutboundMessage>) -> OutboundMessage {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for an outbound message")
        .expect("outbound channel closed")
}

fn error_code(msg: &OutboundMessage) -> &str {
    match msg {
        OutboundMessage::Error { code, .. } => code,
        other => panic!("expected error event, got {other:?}"),
    }
}

async fn settle(gateway: &RoomGateway) {
    for _ in 0..200 {
        if gateway.pipeline().in_flight_count() == 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("conversions did not settle");
}

async fn join(
    f: &Fixture,
    token: &str,
    room: &str,
) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
    let (handle, mut rx) = f.gateway.connect(Some(token.to_string()));
    f.gateway.dispatch(&handle, InboundMessage::Authenticate).await;
    assert!(matches!(next(&mut rx).await, OutboundMessage::Authenticated { .. }));
    f.gateway
        .dispatch(&handle, InboundMessage::JoinRoom(room.to_string()))
        .await;
    assert!(matches!(next(&mut rx).await, OutboundMessage::Joined { .. }));
    (handle, rx)
}

#[tokio::test]
async fn test_editor_text_reaches_viewer_then_markup() {
    let f = fixture().await;
    let (alice, mut alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (_bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.gateway
        .dispatch(&alice, InboundMessage::SendText("x^2".into()))
        .await;

    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveOriginal {
            text: "x^2".into(),
            username: "alice".into(),
        }
    );
    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveText {
            markup: "\\(x^2\\)".into(),
        }
    );

    settle(&f.gateway).await;
    assert!(alice_rx.try_recv().is_err());
}

#[tokio::test]
async fn test_viewer_send_is_denied_without_broadcast() {
    let f = fixture().await;
    let (_alice, mut alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.gateway
        .dispatch(&bob, InboundMessage::SendText("hijack".into()))
        .await;

    assert_eq!(error_code(&next(&mut bob_rx).await), "ACCESS_DENIED");
    assert_eq!(f.gateway.pipeline().in_flight_count(), 0);
    assert!(alice_rx.try_recv().is_err());

    let room = f.rooms.find_room("r1").await.unwrap();
    assert_eq!(room.content, "");
}

#[tokio::test]
async fn test_removed_member_cannot_rejoin() {
    let f = fixture().await;
    f.rooms
        .remove_member(&f.alice, "r1", "bob", RoomRole::Viewer)
        .await
        .unwrap();

    let (bob, mut rx) = f.gateway.connect(Some(f.bob_token.clone()));
    f.gateway.dispatch(&bob, InboundMessage::Authenticate).await;
    next(&mut rx).await;
    f.gateway
        .dispatch(&bob, InboundMessage::JoinRoom("r1".into()))
        .await;

    assert_eq!(error_code(&next(&mut rx).await), "ACCESS_DENIED");
    assert!(!f.gateway.room_members("r1").contains(&bob.id));
    assert_eq!(
        f.gateway.lifecycle_of(bob.id).await,
        Some(LifecycleState::Authenticated)
    );
}

#[tokio::test]
async fn test_role_is_rechecked_on_every_send() {
    let f = fixture().await;
    f.rooms
        .remove_member(&f.alice, "r1", "bob", RoomRole::Viewer)
        .await
        .unwrap();
    f.rooms
        .add_member(&f.alice, "r1", "bob", RoomRole::Editor)
        .await
        .unwrap();
    let (bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.rooms
        .remove_member(&f.alice, "r1", "bob", RoomRole::Editor)
        .await
        .unwrap();
    f.gateway
        .dispatch(&bob, InboundMessage::SendText("late".into()))
        .await;

    assert_eq!(error_code(&next(&mut bob_rx).await), "ACCESS_DENIED");
}

#[tokio::test]
async fn test_unauthenticated_connection_cannot_join() {
    let f = fixture().await;
    let (handle, mut rx) = f.gateway.connect(Some(f.alice_token.clone()));

    f.gateway
        .dispatch(&handle, InboundMessage::JoinRoom("r1".into()))
        .await;
    assert_eq!(error_code(&next(&mut rx).await), "UNAUTHENTICATED");

    f.gateway
        .dispatch(&handle, InboundMessage::SendText("x".into()))
        .await;
    assert_eq!(error_code(&next(&mut rx).await), "UNAUTHENTICATED");
    assert_eq!(
        f.gateway.lifecycle_of(handle.id).await,
        Some(LifecycleState::Connected)
    );
}

#[tokio::test]
async fn test_authenticate_without_valid_session() {
    let f = fixture().await;

    let (anonymous, mut rx) = f.gateway.connect(None);
    f.gateway.dispatch(&anonymous, InboundMessage::Authenticate).await;
    assert_eq!(error_code(&next(&mut rx).await), "UNAUTHENTICATED");

    f.sessions.logout(&f.bob_token).await.unwrap();
    let (bob, mut rx) = f.gateway.connect(Some(f.bob_token.clone()));
    f.gateway.dispatch(&bob, InboundMessage::Authenticate).await;
    assert_eq!(error_code(&next(&mut rx).await), "UNAUTHENTICATED");
    assert_eq!(
        f.gateway.lifecycle_of(bob.id).await,
        Some(LifecycleState::Connected)
    );
}

#[tokio::test]
async fn test_join_unknown_room_and_non_member() {
    let f = fixture().await;
    let mallory = f.sessions.login("mallory", "password1").await.unwrap();

    let (handle, mut rx) = f.gateway.connect(Some(mallory.token));
    f.gateway.dispatch(&handle, InboundMessage::Authenticate).await;
    next(&mut rx).await;

    f.gateway
        .dispatch(&handle, InboundMessage::JoinRoom("nope".into()))
        .await;
    assert_eq!(error_code(&next(&mut rx).await), "NOT_FOUND");

    f.gateway
        .dispatch(&handle, InboundMessage::JoinRoom("r1".into()))
        .await;
    assert_eq!(error_code(&next(&mut rx).await), "ACCESS_DENIED");
    assert!(f.gateway.room_members("r1").is_empty());
}

#[tokio::test]
async fn test_conversion_failure_is_retryable_error_to_editor() {
    let f = fixture().await;
    f.converter.fail.store(true, Ordering::SeqCst);
    let (alice, mut alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (_bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.gateway
        .dispatch(&alice, InboundMessage::SendText("y".into()))
        .await;

    match next(&mut alice_rx).await {
        OutboundMessage::Error {
            code, retryable, ..
        } => {
            assert_eq!(code, "UPSTREAM_FAILURE");
            assert!(retryable);
        }
        other => panic!("expected error event, got {other:?}"),
    }
    assert!(matches!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveOriginal { .. }
    ));

    settle(&f.gateway).await;
    assert!(bob_rx.try_recv().is_err());
    let room = f.rooms.find_room("r1").await.unwrap();
    assert_eq!(room.content, "y");
    assert_eq!(room.markup, "");
}

#[tokio::test]
async fn test_late_joiner_sees_persisted_state() {
    let f = fixture().await;
    let (alice, _alice_rx) = join(&f, &f.alice_token, "r1").await;
    f.gateway
        .dispatch(&alice, InboundMessage::SendText("x^2".into()))
        .await;
    settle(&f.gateway).await;

    let (bob, mut rx) = f.gateway.connect(Some(f.bob_token.clone()));
    f.gateway.dispatch(&bob, InboundMessage::Authenticate).await;
    next(&mut rx).await;
    f.gateway
        .dispatch(&bob, InboundMessage::JoinRoom("r1".into()))
        .await;

    assert_eq!(
        next(&mut rx).await,
        OutboundMessage::Joined {
            room: "r1".into(),
            role: RoomRole::Viewer,
            content: "x^2".into(),
            markup: "\\(x^2\\)".into(),
        }
    );
}

#[tokio::test]
async fn test_disconnect_leaves_group_and_keeps_records() {
    let f = fixture().await;
    let (alice, _alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (bob, _bob_rx) = join(&f, &f.bob_token, "r1").await;
    assert_eq!(f.gateway.room_members("r1").len(), 2);

    f.gateway.disconnect(bob.id).await;

    assert_eq!(f.gateway.room_members("r1"), vec![alice.id]);
    assert_eq!(f.gateway.lifecycle_of(bob.id).await, None);
    assert_eq!(f.gateway.connection_count(), 1);
    assert!(!bob.is_alive());

    let room = f.stores.rooms.find_by_name("r1").await.unwrap().unwrap();
    assert_eq!(room.viewers.len(), 1);
}

#[tokio::test]
async fn test_second_join_moves_connection() {
    let f = fixture().await;
    f.rooms.create_room(&f.alice, "r2").await.unwrap();
    let (alice, mut rx) = join(&f, &f.alice_token, "r1").await;

    f.gateway
        .dispatch(&alice, InboundMessage::JoinRoom("r2".into()))
        .await;
    assert!(matches!(next(&mut rx).await, OutboundMessage::Joined { .. }));

    assert!(f.gateway.room_members("r1").is_empty());
    assert_eq!(f.gateway.room_members("r2"), vec![alice.id]);
}

#[tokio::test]
async fn test_reauthenticate_keeps_room() {
    let f = fixture().await;
    let (alice, mut rx) = join(&f, &f.alice_token, "r1").await;

    f.gateway.dispatch(&alice, InboundMessage::Authenticate).await;

    assert_eq!(
        next(&mut rx).await,
        OutboundMessage::Authenticated {
            username: "alice".into(),
        }
    );
    assert_eq!(
        f.gateway.lifecycle_of(alice.id).await,
        Some(LifecycleState::Joined)
    );
}

#[tokio::test]
async fn test_malformed_frame_keeps_connection() {
    let f = fixture().await;
    let (handle, mut rx) = f.gateway.connect(None);

    f.gateway.handle_inbound(handle.id, "{\"event\":").await;
    assert_eq!(error_code(&next(&mut rx).await), "INVALID_MESSAGE");

    f.gateway
        .handle_inbound(handle.id, r#"{"event":"teleport"}"#)
        .await;
    assert_eq!(error_code(&next(&mut rx).await), "INVALID_MESSAGE");
    assert!(handle.is_alive());
}

async fn wait_for_markup(f: &Fixture, markup: &str) {
    for _ in 0..200 {
        let room = f.stores.rooms.find_by_name("r1").await.unwrap().unwrap();
        if room.markup == markup {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("markup never became {markup:?}");
}

#[tokio::test]
async fn test_out_of_order_results_after_editor_disconnects() {
    let f = fixture().await;
    let one = f.converter.gate("one");
    let two = f.converter.gate("two");
    let (alice, _alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (_bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.gateway
        .dispatch(&alice, InboundMessage::SendText("one".into()))
        .await;
    f.gateway
        .dispatch(&alice, InboundMessage::SendText("two".into()))
        .await;
    for text in ["one", "two"] {
        assert_eq!(
            next(&mut bob_rx).await,
            OutboundMessage::ReceiveOriginal {
                text: text.into(),
                username: "alice".into(),
            }
        );
    }
    assert_eq!(f.gateway.pipeline().in_flight_count(), 2);

    f.gateway.disconnect(alice.id).await;

    two.notify_one();
    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveText {
            markup: "\\(two\\)".into()
        }
    );
    wait_for_markup(&f, "\\(two\\)").await;

    one.notify_one();
    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveText {
            markup: "\\(one\\)".into()
        }
    );
    settle(&f.gateway).await;

    let room = f.stores.rooms.find_by_name("r1").await.unwrap().unwrap();
    assert_eq!(room.content, "two");
    assert_eq!(room.markup, "\\(one\\)");
}

#[tokio::test]
async fn test_edit_counter_restarts_once_room_empties() {
    let f = fixture().await;
    let (alice, _alice_rx) = join(&f, &f.alice_token, "r1").await;
    f.gateway
        .dispatch(&alice, InboundMessage::SendText("x".into()))
        .await;
    settle(&f.gateway).await;
    assert_eq!(f.gateway.pipeline().next_seq("r1"), 2);

    f.gateway.disconnect(alice.id).await;
    assert_eq!(f.gateway.pipeline().next_seq("r1"), 1);
}

#[tokio::test]
async fn test_member_removed_while_connected_stays_in_group_until_leaving() {
    let f = fixture().await;
    let (alice, _alice_rx) = join(&f, &f.alice_token, "r1").await;
    let (bob, mut bob_rx) = join(&f, &f.bob_token, "r1").await;

    f.rooms
        .remove_member(&f.alice, "r1", "bob", RoomRole::Viewer)
        .await
        .unwrap();
    assert!(f.gateway.room_members("r1").contains(&bob.id));

    f.gateway
        .dispatch(&alice, InboundMessage::SendText("z".into()))
        .await;
    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveOriginal {
            text: "z".into(),
            username: "alice".into(),
        }
    );
    assert_eq!(
        next(&mut bob_rx).await,
        OutboundMessage::ReceiveText {
            markup: "\\(z\\)".into()
        }
    );

    f.gateway
        .dispatch(&bob, InboundMessage::SendText("mine".into()))
        .await;
    assert_eq!(error_code(&next(&mut bob_rx).await), "ACCESS_DENIED");

    f.gateway
        .dispatch(&bob, InboundMessage::JoinRoom("r1".into()))
        .await;
    assert_eq!(error_code(&next(&mut bob_rx).await), "ACCESS_DENIED");

    f.gateway.disconnect(bob.id).await;
    assert_eq!(f.gateway.room_members("r1"), vec![alice.id]);
}
