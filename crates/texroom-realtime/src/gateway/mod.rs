//! Room gateway: the event handler behind every real-time connection.
//!
//! Inbound events of one connection are handled one at a time, in order.
//! Every privileged event re-reads the room record and re-checks the
//! caller's role; nothing is cached between events.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use texroom_auth::access;
use texroom_core::config::realtime::RealtimeConfig;
use texroom_core::error::AppError;
use texroom_database::store::RoomStore;
use texroom_entity::room::validate_room_name;
use texroom_service::conversion::Converter;

use crate::channel::fanout::Fanout;
use crate::channel::registry::ChannelRegistry;
use crate::connection::authenticator::SessionResolver;
use crate::connection::handle::{ConnectionHandle, ConnectionId};
use crate::connection::pool::ConnectionPool;
use crate::connection::state::{JoinedRoom, LifecycleState};
use crate::message::types::{InboundMessage, OutboundMessage};
use crate::message::validator::parse_inbound;
use crate::pipeline::{ConversionJob, ConversionPipeline};

/// Owns live connections and dispatches their events.
#[derive(Debug)]
pub struct RoomGateway {
    pool: Arc<ConnectionPool>,
    channels: Arc<ChannelRegistry>,
    fanout: Fanout,
    sessions: Arc<dyn SessionResolver>,
    rooms: Arc<dyn RoomStore>,
    pipeline: ConversionPipeline,
    config: RealtimeConfig,
}

impl RoomGateway {
    /// Creates a gateway over the given collaborators.
    pub fn new(
        config: RealtimeConfig,
        sessions: Arc<dyn SessionResolver>,
        rooms: Arc<dyn RoomStore>,
        converter: Arc<dyn Converter>,
    ) -> Self {
        let pool = Arc::new(ConnectionPool::new());
        let channels = Arc::new(ChannelRegistry::new());
        let fanout = Fanout::new(Arc::clone(&pool), Arc::clone(&channels));
        let pipeline = ConversionPipeline::new(converter, Arc::clone(&rooms), fanout.clone());
        Self {
            pool,
            channels,
            fanout,
            sessions,
            rooms,
            pipeline,
            config,
        }
    }

    /// Number of live connections.
    pub fn connection_count(&self) -> usize {
        self.pool.connection_count()
    }

    /// Number of rooms with at least one joined connection.
    pub fn active_room_count(&self) -> usize {
        self.channels.channel_count()
    }

    /// The conversion pipeline.
    pub fn pipeline(&self) -> &ConversionPipeline {
        &self.pipeline
    }

    /// Registers a new transport in the `Connected` state.
    ///
    /// `session_token` is whatever the handshake carried; it is only
    /// resolved when the client sends `authenticate`.
    pub fn connect(
        &self,
        session_token: Option<String>,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let (tx, rx) = mpsc::channel(self.config.outbound_buffer_size.max(1));
        let handle = Arc::new(ConnectionHandle::new(session_token, tx));
        self.pool.add(Arc::clone(&handle));
        info!(conn_id = %handle.id, "Connection opened");
        (handle, rx)
    }

    /// Parses and dispatches one raw text frame.
    pub async fn handle_inbound(&self, conn_id: ConnectionId, raw: &str) {
        let Some(handle) = self.pool.get(&conn_id) else {
            warn!(conn_id = %conn_id, "Message from unknown connection");
            return;
        };

        match parse_inbound(raw, self.config.max_message_bytes) {
            Ok(msg) => self.dispatch(&handle, msg).await,
            Err(error) => {
                debug!(conn_id = %conn_id, "Rejected malformed frame");
                handle.send(error);
            }
        }
    }

    /// Dispatches one parsed event. Failures become an `error` event on the
    /// same connection.
    pub async fn dispatch(&self, handle: &ConnectionHandle, msg: InboundMessage) {
        let result = match msg {
            InboundMessage::Authenticate => self.authenticate(handle).await,
            InboundMessage::JoinRoom(room) => self.join_room(handle, &room).await,
            InboundMessage::SendText(text) => self.send_text(handle, text).await,
        };

        if let Err(e) = result {
            debug!(conn_id = %handle.id, code = e.kind.code(), error = %e, "Event rejected");
            handle.send(OutboundMessage::error(&e));
        }
    }

    /// `authenticate`: resolve the handshake session and bind its identity.
    ///
    /// On failure the connection stays where it was.
    pub async fn authenticate(&self, handle: &ConnectionHandle) -> Result<(), AppError> {
        let token = handle
            .session_token()
            .ok_or_else(|| AppError::unauthenticated("No session bound to this connection"))?;

        let identity = self.sessions.resolve(token).await?;
        let username = identity.username.clone();
        let user_id = identity.user_id;

        if !handle.state.write().await.authenticate(identity) {
            return Err(AppError::unauthenticated("Connection is closed"));
        }

        info!(conn_id = %handle.id, user_id = %user_id, "Connection authenticated");
        handle.send(OutboundMessage::Authenticated { username });
        Ok(())
    }

    /// `join-room`: admit the connection to a room it is a member of and
    /// send it the last persisted state.
    pub async fn join_room(&self, handle: &ConnectionHandle, name: &str) -> Result<(), AppError> {
        let identity = {
            let state = handle.state.read().await;
            state
                .identity()
                .cloned()
                .ok_or_else(|| AppError::unauthenticated("Authenticate before joining a room"))?
        };

        validate_room_name(name)?;
        let room = self
            .rooms
            .find_by_name(name)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Room '{name}' not found")))?;

        let Some(role) = access::role_of(&room, identity.user_id).role() else {
            return Err(AppError::access_denied(format!(
                "You are not a member of room '{name}'"
            )));
        };

        let joined = JoinedRoom {
            id: room.id,
            name: room.name.clone(),
        };
        handle
            .state
            .write()
            .await
            .join(joined)
            .map_err(|_| AppError::unauthenticated("Authenticate before joining a room"))?;

        if let Some(left) = self.channels.join(&room.name, handle.id) {
            debug!(conn_id = %handle.id, room = %left, "Left previous room");
            self.release_if_empty(&left);
        }

        info!(
            conn_id = %handle.id,
            user_id = %identity.user_id,
            room = %room.name,
            role = %role,
            "Joined room"
        );

        handle.send(OutboundMessage::Joined {
            room: room.name,
            role,
            content: room.content,
            markup: room.markup,
        });
        Ok(())
    }

    /// `send-text`: relay an editor's text, persist it, then convert it.
    pub async fn send_text(&self, handle: &ConnectionHandle, text: String) -> Result<(), AppError> {
        let (identity, joined) = {
            let state = handle.state.read().await;
            let identity = state
                .identity()
                .cloned()
                .ok_or_else(|| AppError::unauthenticated("Authenticate before sending text"))?;
            let joined = state
                .room()
                .cloned()
                .ok_or_else(|| AppError::access_denied("Join a room before sending text"))?;
            (identity, joined)
        };

        let room = self
            .rooms
            .find_by_id(joined.id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Room '{}' not found", joined.name)))?;
        access::require_editor(&room, identity.user_id)?;

        if !handle.state.write().await.begin_edit() {
            return Err(AppError::access_denied("Join a room before sending text"));
        }
        let result = self.accept_edit(handle, &identity.username, &joined, text).await;
        handle.state.write().await.finish_edit();
        result
    }

    async fn accept_edit(
        &self,
        handle: &ConnectionHandle,
        username: &str,
        room: &JoinedRoom,
        text: String,
    ) -> Result<(), AppError> {
        let original = OutboundMessage::ReceiveOriginal {
            text: text.clone(),
            username: username.to_string(),
        };
        self.fanout.broadcast_except(&room.name, handle.id, &original);

        self.rooms.save_content(room.id, &text).await?;

        let seq = self.pipeline.next_seq(&room.name);
        debug!(conn_id = %handle.id, room = %room.name, seq, "Edit accepted");
        self.pipeline.submit(ConversionJob {
            room_id: room.id,
            room_name: room.name.clone(),
            seq,
            origin: handle.id,
            text,
        });
        Ok(())
    }

    /// Transport closed: leave the room group and forget the connection.
    ///
    /// Room and user records are untouched; in-flight conversions continue.
    pub async fn disconnect(&self, conn_id: ConnectionId) {
        let Some(handle) = self.pool.remove(&conn_id) else {
            return;
        };
        handle.mark_dead();
        let left = handle.state.write().await.disconnect();
        if let Some(room) = self.channels.leave(conn_id) {
            self.release_if_empty(&room);
        }

        info!(
            conn_id = %conn_id,
            room = left.as_ref().map(|r| r.name.as_str()).unwrap_or("-"),
            "Connection closed"
        );
    }

    /// Closes every connection. Used on shutdown.
    pub async fn disconnect_all(&self) {
        for handle in self.pool.drain() {
            handle.mark_dead();
            handle.state.write().await.disconnect();
            self.channels.leave(handle.id);
        }
    }

    /// Lifecycle state of a connection, if it is still registered.
    pub async fn lifecycle_of(&self, conn_id: ConnectionId) -> Option<LifecycleState> {
        let handle = self.pool.get(&conn_id)?;
        let lifecycle = handle.state.read().await.lifecycle();
        Some(lifecycle)
    }

    fn release_if_empty(&self, room: &str) {
        if self.channels.members(room).is_empty() && self.pipeline.release_room(room) {
            debug!(room = %room, "Room group emptied");
        }
    }

    /// Members of a room's broadcast group.
    pub fn room_members(&self, room: &str) -> Vec<ConnectionId> {
        self.channels.members(room)
    }
}

#[cfg(test)]
mod tests;
