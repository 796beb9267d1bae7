//! Per-connection lifecycle state machine.
//!
//! `Connected → Authenticated → Joined ⇄ Editing → Disconnected`.
//! `Editing` is only reachable from `Joined` and returns there once the
//! edit has been accepted. Any state may move to `Disconnected`.

use serde::Serialize;
use uuid::Uuid;

use texroom_entity::user::Identity;

/// Where a connection is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// Transport established, no identity bound.
    Connected,
    /// Identity bound, no room joined.
    Authenticated,
    /// Member of one room's broadcast group.
    Joined,
    /// Handling an accepted edit.
    Editing,
    /// Transport closed.
    Disconnected,
}

/// The room a connection has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinedRoom {
    /// Room ID, used to refetch the record on every edit.
    pub id: Uuid,
    /// Room name, the broadcast group key.
    pub name: String,
}

/// Mutable per-connection state.
#[derive(Debug, Clone)]
pub struct ConnectionState {
    lifecycle: LifecycleState,
    identity: Option<Identity>,
    room: Option<JoinedRoom>,
}

impl Default for ConnectionState {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionState {
    /// A fresh, unauthenticated connection.
    pub fn new() -> Self {
        Self {
            lifecycle: LifecycleState::Connected,
            identity: None,
            room: None,
        }
    }

    /// Current lifecycle state.
    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    /// The bound identity, once authenticated.
    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// The joined room, if any.
    pub fn room(&self) -> Option<&JoinedRoom> {
        self.room.as_ref()
    }

    /// Whether an identity is bound and the transport is still open.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some() && self.lifecycle != LifecycleState::Disconnected
    }

    /// Bind (or rebind) an identity. A joined connection stays joined.
    pub fn authenticate(&mut self, identity: Identity) -> bool {
        match self.lifecycle {
            LifecycleState::Disconnected => false,
            LifecycleState::Connected => {
                self.identity = Some(identity);
                self.lifecycle = LifecycleState::Authenticated;
                true
            }
            _ => {
                self.identity = Some(identity);
                true
            }
        }
    }

    /// Enter `room`, returning the room that was left, if any.
    ///
    /// Requires an authenticated connection; otherwise returns the current
    /// state unchanged as the error.
    pub fn join(&mut self, room: JoinedRoom) -> Result<Option<JoinedRoom>, LifecycleState> {
        if !self.is_authenticated() {
            return Err(self.lifecycle);
        }
        let previous = self.room.replace(room);
        self.lifecycle = LifecycleState::Joined;
        Ok(previous.filter(|prev| Some(prev) != self.room.as_ref()))
    }

    /// `Joined → Editing`. Returns `false` from any other state.
    pub fn begin_edit(&mut self) -> bool {
        if self.lifecycle == LifecycleState::Joined {
            self.lifecycle = LifecycleState::Editing;
            true
        } else {
            false
        }
    }

    /// `Editing → Joined`.
    pub fn finish_edit(&mut self) {
        if self.lifecycle == LifecycleState::Editing {
            self.lifecycle = LifecycleState::Joined;
        }
    }

    /// Close the connection, returning the room it was in.
    pub fn disconnect(&mut self) -> Option<JoinedRoom> {
        self.lifecycle = LifecycleState::Disconnected;
        self.room.take()
    }
}
