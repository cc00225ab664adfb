use crate::session::NegotiationState;
use huddle_core::{ConnectionId, Participant};
use tokio::sync::oneshot;

/// Inputs driving the orchestrator: presence deltas from the registry,
/// addressed negotiation messages from the relay, and local mic state.
#[derive(Debug)]
pub enum EngineEvent {
    /// Full roster delivered on a successful join.
    RosterSnapshot(Vec<Participant>),

    PeerJoined(Participant),

    PeerUpdated {
        id: ConnectionId,
        audio_enabled: bool,
    },

    PeerLeft(ConnectionId),

    Offer {
        from: ConnectionId,
        payload: String,
    },

    Answer {
        from: ConnectionId,
        payload: String,
    },

    Candidate {
        from: ConnectionId,
        payload: String,
    },

    LocalAudio(bool),

    /// Introspection: live sessions and their negotiation states.
    Inspect {
        reply: oneshot::Sender<Vec<SessionInfo>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionInfo {
    pub remote_id: ConnectionId,
    pub state: NegotiationState,
}
