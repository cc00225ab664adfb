use crate::signaling::Outbound;
use async_trait::async_trait;
use axum::extract::ws::Message;
use dashmap::DashMap;
use huddle_core::{ClientMessage, ConnectionId, IceServerConfig, ServerMessage};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error};

struct SignalingInner {
    peers: DashMap<ConnectionId, mpsc::UnboundedSender<Message>>,
    ice_servers: Vec<IceServerConfig>,
}

/// Stateless message router keyed by live connection identity.
///
/// Holds one outbound channel per connected endpoint; the relay forwards
/// negotiation messages between exactly two of them without interpreting
/// the payload.
#[derive(Clone)]
pub struct SignalingService {
    inner: Arc<SignalingInner>,
}

impl SignalingService {
    pub fn new(ice_servers: Vec<IceServerConfig>) -> Self {
        Self {
            inner: Arc::new(SignalingInner {
                peers: DashMap::new(),
                ice_servers,
            }),
        }
    }

    pub fn ice_servers(&self) -> Vec<IceServerConfig> {
        self.inner.ice_servers.clone()
    }

    pub fn register(&self, id: ConnectionId, tx: mpsc::UnboundedSender<Message>) {
        self.inner.peers.insert(id, tx);
    }

    /// Invalidates the connection for relay purposes; later sends to it
    /// are dropped.
    pub fn unregister(&self, id: &ConnectionId) {
        self.inner.peers.remove(id);
    }

    pub fn is_connected(&self, id: &ConnectionId) -> bool {
        self.inner.peers.contains_key(id)
    }

    /// Forward a negotiation message to its addressee, stamping `from` with
    /// the sender's verified connection identity.
    ///
    /// An unknown addressee is a benign race (the peer may be mid-disconnect):
    /// the message is dropped and nothing is surfaced to the sender.
    pub fn relay(&self, from: ConnectionId, msg: ClientMessage) {
        let (to, forwarded) = match msg {
            ClientMessage::Offer { to, payload } => (to, ServerMessage::Offer { from, payload }),
            ClientMessage::Answer { to, payload } => (to, ServerMessage::Answer { from, payload }),
            ClientMessage::IceCandidate { to, payload } => {
                (to, ServerMessage::IceCandidate { from, payload })
            }
            other => {
                debug!("Relay ignoring non-negotiation message from {from}: {other:?}");
                return;
            }
        };

        self.send_to(to, &forwarded);
    }

    pub fn send_to(&self, id: ConnectionId, msg: &ServerMessage) {
        let Some(peer) = self.inner.peers.get(&id) else {
            debug!("Dropping message to disconnected endpoint {id}");
            return;
        };

        match serde_json::to_string(msg) {
            Ok(json) => {
                if peer.send(Message::Text(json.into())).is_err() {
                    debug!("Outbound channel for {id} is closed");
                }
            }
            Err(e) => error!("Failed to serialize server message: {e}"),
        }
    }
}

#[async_trait]
impl Outbound for SignalingService {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage) {
        self.send_to(to, &msg);
    }
}
