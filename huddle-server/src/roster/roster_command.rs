use huddle_core::{ConnectionId, Participant};
use thiserror::Error;
use tokio::sync::oneshot;

/// Commands entering the presence registry from the WebSocket layer.
#[derive(Debug)]
pub enum RosterCommand {
    /// Read-only identity probe. Not a reservation: a race between the
    /// probe and a later join is resolved at join time.
    ValidateName {
        name: String,
        reply: oneshot::Sender<bool>,
    },

    /// Atomic uniqueness check + insert. Replies with the full roster
    /// snapshot on success.
    Join {
        id: ConnectionId,
        name: String,
        audio_enabled: bool,
        reply: oneshot::Sender<Result<Vec<Participant>, RegistryError>>,
    },

    /// Mic state change for an existing participant.
    SetAudio {
        id: ConnectionId,
        audio_enabled: bool,
    },

    /// Removal on disconnect or explicit leave. Idempotent.
    Leave { id: ConnectionId },

    /// Read-only roster dump.
    Snapshot {
        reply: oneshot::Sender<Vec<Participant>>,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("the name {0:?} is already taken")]
    NameTaken(String),

    #[error("presence registry is not running")]
    Closed,
}
