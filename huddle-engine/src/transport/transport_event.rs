use huddle_core::ConnectionId;

/// Observations a media transport reports back to its orchestrator, tagged
/// with the remote peer the transport belongs to.
#[derive(Debug)]
pub enum TransportEvent {
    /// Trickle ICE: a locally gathered candidate is ready to be relayed.
    CandidateGenerated(ConnectionId, String),

    /// The connectivity check succeeded.
    ConnectionEstablished(ConnectionId),

    /// The transport failed or closed permanently.
    ConnectionLost(ConnectionId),
}
