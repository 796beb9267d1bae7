//! Inbound and outbound event definitions.
//!
//! Every frame is a JSON text frame of the form
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use texroom_core::error::AppError;
use texroom_entity::room::RoomRole;

/// Error code for frames that cannot be parsed or exceed the size limit.
pub const INVALID_MESSAGE: &str = "INVALID_MESSAGE";

/// Events sent by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum InboundMessage {
    /// Bind the handshake session to this connection.
    Authenticate,
    /// Enter a room's broadcast group by name.
    JoinRoom(String),
    /// Replace the room buffer with this text.
    SendText(String),
}

/// Events sent by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum OutboundMessage {
    /// The session was resolved.
    Authenticated {
        /// Display name of the session owner.
        username: String,
    },
    /// The join was accepted; carries the last persisted state.
    Joined {
        /// Room name.
        room: String,
        /// The connection's role in the room.
        role: RoomRole,
        /// Last persisted buffer text.
        content: String,
        /// Last persisted markup.
        markup: String,
    },
    /// An action was rejected. Only the acting connection receives it.
    Error {
        /// Machine-readable code.
        code: String,
        /// Human-readable description.
        message: String,
        /// Whether repeating the same action may succeed.
        retryable: bool,
    },
    /// Raw text from an editor, relayed to the rest of the room.
    ReceiveOriginal {
        /// The text as sent.
        text: String,
        /// Sender's display name.
        username: String,
    },
    /// Converted markup for the most recently resolved edit.
    ReceiveText {
        /// LaTeX markup.
        markup: String,
    },
}

impl OutboundMessage {
    /// An `error` event describing `err`.
    pub fn error(err: &AppError) -> Self {
        Self::Error {
            code: err.kind.code().to_string(),
            message: err.message.clone(),
            retryable: err.kind.is_retryable(),
        }
    }

    /// An `error` event for a frame that could not be accepted.
    pub fn invalid_message(message: impl Into<String>) -> Self {
        Self::Error {
            code: INVALID_MESSAGE.to_string(),
            message: message.into(),
            retryable: false,
        }
    }

    /// Serialize for the wire.
    pub fn to_json(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string(self)?)
    }
}
