use crate::model::participant::{ConnectionId, Participant};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    /// Public STUN fallback used when no TURN deployment is configured.
    pub fn default_stun() -> Vec<Self> {
        vec![Self {
            urls: vec!["stun:stun.l.google.com:19302".to_owned()],
            username: None,
            credential: None,
        }]
    }
}

/// Messages a connected endpoint sends to the relay.
///
/// Offer/answer/candidate payloads are opaque strings; the relay forwards
/// them verbatim and never inspects their contents.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum ClientMessage {
    ValidateName {
        name: String,
    },
    Join {
        name: String,
        audio_enabled: bool,
    },
    AudioToggle {
        audio_enabled: bool,
    },
    Offer {
        to: ConnectionId,
        payload: String,
    },
    Answer {
        to: ConnectionId,
        payload: String,
    },
    IceCandidate {
        to: ConnectionId,
        payload: String,
    },
    Leave,
}

/// Messages the relay sends to a connected endpoint.
///
/// `from` on the relayed variants is always the sender's verified connection
/// id, stamped server-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "op", content = "d", rename_all = "kebab-case")]
#[serde(rename_all_fields = "camelCase")]
pub enum ServerMessage {
    IceConfig {
        ice_servers: Vec<IceServerConfig>,
    },
    Welcome {
        id: ConnectionId,
    },
    NameValidation {
        is_valid: bool,
    },
    Joined {
        roster: Vec<Participant>,
    },
    JoinError {
        message: String,
    },
    ParticipantJoined {
        participant: Participant,
    },
    ParticipantUpdated {
        id: ConnectionId,
        audio_enabled: bool,
    },
    ParticipantLeft {
        id: ConnectionId,
    },
    Offer {
        from: ConnectionId,
        payload: String,
    },
    Answer {
        from: ConnectionId,
        payload: String,
    },
    IceCandidate {
        from: ConnectionId,
        payload: String,
    },
}
