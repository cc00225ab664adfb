use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Ephemeral handle for one live connection to the relay.
///
/// Identity (the display name) is stable and case-insensitively unique;
/// the handle is minted per connection and may be replaced on reconnect.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
#[error("invalid connection id: {0}")]
pub struct ParseConnectionIdError(#[from] uuid::Error);

impl FromStr for ConnectionId {
    type Err = ParseConnectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Public roster entry for one participant in the room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ConnectionId,
    pub name: String,
    pub audio_enabled: bool,
}

impl Participant {
    pub fn new(id: ConnectionId, name: impl Into<String>, audio_enabled: bool) -> Self {
        Self {
            id,
            name: name.into(),
            audio_enabled,
        }
    }

    /// Case-normalized identity used for uniqueness checks and initiator
    /// ordering.
    pub fn identity_key(&self) -> String {
        normalize_identity(&self.name)
    }
}

/// Lowercase the display name so "Alice" and "alice" collide.
pub fn normalize_identity(name: &str) -> String {
    name.trim().to_lowercase()
}
