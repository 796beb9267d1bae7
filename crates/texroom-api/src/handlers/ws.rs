//! WebSocket upgrade handler.
//!
//! The session token is captured from the handshake but only resolved when
//! the client sends `authenticate`. Each socket gets one forwarder task for
//! outbound events and pings; inbound frames are handled sequentially on
//! the upgrade task.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::http::HeaderMap;
use axum::response::Response;
use futures::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use texroom_realtime::OutboundMessage;

use crate::extractors::session_token;
use crate::state::AppState;

/// GET /ws
pub async fn ws_upgrade(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let token = session_token(&headers, &state.config.auth.session_cookie);
    ws.on_upgrade(move |socket| handle_ws_connection(state, token, socket))
}

/// Handles an established WebSocket connection.
async fn handle_ws_connection(state: AppState, token: Option<String>, socket: WebSocket) {
    let engine = Arc::clone(&state.realtime);
    let gateway = Arc::clone(&engine.gateway);
    let mut shutdown_rx = engine.shutdown_receiver();

    let (handle, outbound_rx) = gateway.connect(token);
    let conn_id = handle.id;
    let (ws_tx, mut ws_rx) = socket.split();

    let ping_every = Duration::from_secs(engine.config.ping_interval_seconds.max(1));
    let mut outbound_task = tokio::spawn(forward_outbound(outbound_rx, ws_tx, ping_every));

    loop {
        tokio::select! {
            frame = ws_rx.next() => match frame {
                Some(Ok(Message::Text(text))) => {
                    gateway.handle_inbound(conn_id, text.as_str()).await;
                }
                Some(Ok(Message::Binary(_))) => {
                    handle.send(OutboundMessage::invalid_message("Binary frames are not supported"));
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!(conn_id = %conn_id, error = %e, "WebSocket error");
                    break;
                }
            },
            _ = shutdown_rx.recv() => {
                debug!(conn_id = %conn_id, "Closing connection for shutdown");
                break;
            }
            _ = &mut outbound_task => {
                debug!(conn_id = %conn_id, "Outbound writer stopped");
                break;
            }
        }
    }

    gateway.disconnect(conn_id).await;
    outbound_task.abort();

    info!(conn_id = %conn_id, "WebSocket connection closed");
}

/// Serializes queued events onto the socket and keeps it alive with pings.
async fn forward_outbound<S>(
    mut outbound_rx: mpsc::Receiver<OutboundMessage>,
    mut ws_tx: S,
    ping_every: Duration,
) where
    S: futures::Sink<Message> + Unpin,
{
    let mut ping = tokio::time::interval(ping_every);
    ping.tick().await;

    loop {
        tokio::select! {
            msg = outbound_rx.recv() => {
                let Some(msg) = msg else { break };
                let text = match msg.to_json() {
                    Ok(text) => text,
                    Err(e) => {
                        warn!(error = %e, "Failed to serialize outbound event");
                        continue;
                    }
                };
                if ws_tx.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if ws_tx.send(Message::Ping(Default::default())).await.is_err() {
                    break;
                }
            }
        }
    }

    let _ = ws_tx.send(Message::Close(None)).await;
}
