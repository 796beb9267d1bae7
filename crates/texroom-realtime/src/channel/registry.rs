//! Channel registry: room name → member connections.
//!
//! A connection belongs to at most one room channel. Joining a second
//! room removes it from the first.

use dashmap::DashMap;

use crate::connection::handle::ConnectionId;

/// Registry of room broadcast groups with a reverse index.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    /// Room name → members in join order.
    channels: DashMap<String, Vec<ConnectionId>>,
    /// Connection → the room it is in.
    memberships: DashMap<ConnectionId, String>,
}

impl ChannelRegistry {
    /// Creates a new channel registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Puts `conn_id` in `room`, returning the room it left, if different.
    pub fn join(&self, room: &str, conn_id: ConnectionId) -> Option<String> {
        let previous = self.memberships.insert(conn_id, room.to_string());
        let left = previous.filter(|prev| prev != room);
        if let Some(prev) = &left {
            self.remove_member(prev, conn_id);
        }

        let mut members = self.channels.entry(room.to_string()).or_default();
        if !members.contains(&conn_id) {
            members.push(conn_id);
        }
        left
    }

    /// Removes `conn_id` from whatever room it is in.
    pub fn leave(&self, conn_id: ConnectionId) -> Option<String> {
        let (_, room) = self.memberships.remove(&conn_id)?;
        self.remove_member(&room, conn_id);
        Some(room)
    }

    fn remove_member(&self, room: &str, conn_id: ConnectionId) {
        if let Some(mut members) = self.channels.get_mut(room) {
            members.retain(|id| *id != conn_id);
            if members.is_empty() {
                drop(members);
                self.channels.remove_if(room, |_, members| members.is_empty());
            }
        }
    }

    /// Returns all member connection IDs for a room.
    pub fn members(&self, room: &str) -> Vec<ConnectionId> {
        self.channels
            .get(room)
            .map(|members| members.clone())
            .unwrap_or_default()
    }

    /// The room `conn_id` is in.
    pub fn room_of(&self, conn_id: ConnectionId) -> Option<String> {
        self.memberships.get(&conn_id).map(|room| room.clone())
    }

    /// Returns total number of rooms with at least one member.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}
