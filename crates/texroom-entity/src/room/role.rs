//! Room role enumerations.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A membership list a user can be placed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomRole {
    /// May send text.
    Editor,
    /// Receives broadcasts only.
    Viewer,
}

impl RoomRole {
    /// Return the role as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
        }
    }

    /// The other membership list.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Editor => Self::Viewer,
            Self::Viewer => Self::Editor,
        }
    }
}

impl fmt::Display for RoomRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RoomRole {
    type Err = texroom_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "editor" => Ok(Self::Editor),
            "viewer" => Ok(Self::Viewer),
            _ => Err(texroom_core::AppError::validation(format!(
                "Invalid room role: '{s}'. Expected one of: editor, viewer"
            ))),
        }
    }
}

/// The effective access a user has to a room.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomAccess {
    /// Member of the editor set.
    Editor,
    /// Member of the viewer set only.
    Viewer,
    /// Not a member.
    None,
}

impl RoomAccess {
    /// The membership role, if any.
    pub fn role(&self) -> Option<RoomRole> {
        match self {
            Self::Editor => Some(RoomRole::Editor),
            Self::Viewer => Some(RoomRole::Viewer),
            Self::None => None,
        }
    }

    /// Return the access level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Viewer => "viewer",
            Self::None => "none",
        }
    }
}

impl From<RoomRole> for RoomAccess {
    fn from(role: RoomRole) -> Self {
        match role {
            RoomRole::Editor => Self::Editor,
            RoomRole::Viewer => Self::Viewer,
        }
    }
}

impl fmt::Display for RoomAccess {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
