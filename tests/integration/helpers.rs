//! Shared test helpers for integration tests.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use futures::{SinkExt, StreamExt};
use http::{HeaderMap, Request, StatusCode};
use serde_json::{Value, json};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tower::ServiceExt;

use texroom_api::{AppState, build_app};
use texroom_core::config::AppConfig;
use texroom_core::config::database::StoreBackend;
use texroom_database::Stores;
use texroom_service::conversion::PassthroughConverter;

/// A live WebSocket client.
pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Default password used by every test account.
pub const PASSWORD: &str = "password123";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, also served by [`TestApp::spawn_server`]
    pub state: AppState,
}

impl TestApp {
    /// Create a new test application on in-memory stores with a
    /// pass-through converter.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.database.backend = StoreBackend::Memory;

        let state = AppState::new(config, &Stores::memory(), Arc::new(PassthroughConverter));
        Self {
            router: build_app(state.clone()),
            state,
        }
    }

    /// Sign up `username` and return its session token.
    pub async fn signup(&self, username: &str) -> String {
        let response = self
            .request(
                "POST",
                "/signup",
                Some(json!({ "username": username, "password": PASSWORD })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
        response.body["data"]["token"]
            .as_str()
            .expect("signup response carries a token")
            .to_string()
    }

    /// Make a JSON request, optionally with a bearer token.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let mut req = Request::builder().method(method).uri(path);
        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }
        self.send(req, body).await
    }

    /// Make a JSON request carrying the session cookie.
    pub async fn request_with_cookie(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: &str,
    ) -> TestResponse {
        let req = Request::builder()
            .method(method)
            .uri(path)
            .header("Cookie", format!("session_id={}", token));
        self.send(req, body).await
    }

    async fn send(&self, req: http::request::Builder, body: Option<Value>) -> TestResponse {
        let req = match body {
            Some(body) => req
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string())),
            None => req.body(Body::empty()),
        }
        .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
        }
    }

    /// Serve the app on an ephemeral local port.
    pub async fn spawn_server(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has an address");
        let app = build_app(self.state.clone());
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Test server failed");
        });
        addr
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// Every `Set-Cookie` header value.
    pub fn set_cookies(&self) -> Vec<String> {
        self.headers
            .get_all("set-cookie")
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(String::from)
            .collect()
    }
}

/// How a WebSocket client presents its session at handshake.
pub enum Handshake<'a> {
    Cookie(&'a str),
    Bearer(&'a str),
    Anonymous,
}

/// Open a WebSocket to `/ws`.
pub async fn ws_connect(addr: SocketAddr, handshake: Handshake<'_>) -> WsClient {
    let mut req = format!("ws://{addr}/ws")
        .into_client_request()
        .expect("Valid ws request");
    let header = match handshake {
        Handshake::Cookie(token) => Some(("Cookie", format!("session_id={token}"))),
        Handshake::Bearer(token) => Some(("Authorization", format!("Bearer {token}"))),
        Handshake::Anonymous => None,
    };
    if let Some((name, value)) = header {
        req.headers_mut()
            .insert(name, HeaderValue::from_str(&value).expect("Valid header"));
    }

    let (ws, _) = tokio_tungstenite::connect_async(req)
        .await
        .expect("WebSocket handshake failed");
    ws
}

/// Send one event frame.
pub async fn send_event(ws: &mut WsClient, event: Value) {
    ws.send(Message::Text(event.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Send a raw text frame.
pub async fn send_raw(ws: &mut WsClient, raw: &str) {
    ws.send(Message::Text(raw.to_string().into()))
        .await
        .expect("Failed to send frame");
}

/// Next event frame, skipping control frames.
pub async fn next_event(ws: &mut WsClient) -> Value {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, ws.next())
            .await
            .expect("Timed out waiting for an event")
            .expect("Socket closed")
            .expect("Socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).expect("Event is JSON");
        }
    }
}

/// Asserts no event frame arrives within `window`.
pub async fn expect_silence(ws: &mut WsClient, window: Duration) {
    let quiet = tokio::time::timeout(window, async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.to_string()),
                Some(Ok(_)) => continue,
                _ => return None,
            }
        }
    })
    .await;
    if let Ok(Some(text)) = quiet {
        panic!("Unexpected event: {text}");
    }
}

/// Authenticate and join `room`, consuming both acknowledgements.
pub async fn authenticate_and_join(ws: &mut WsClient, room: &str) -> Value {
    send_event(ws, json!({ "event": "authenticate" })).await;
    let ack = next_event(ws).await;
    assert_eq!(ack["event"], "authenticated", "{ack}");

    send_event(ws, json!({ "event": "join-room", "data": room })).await;
    let joined = next_event(ws).await;
    assert_eq!(joined["event"], "joined", "{joined}");
    joined
}
