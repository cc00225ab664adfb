use async_trait::async_trait;
use huddle_core::ConnectionId;

/// Outbound negotiation seam toward the relay, implemented by the endpoint's
/// socket layer.
#[async_trait]
pub trait SignalSink: Send + Sync {
    async fn send_offer(&self, to: ConnectionId, payload: String);

    async fn send_answer(&self, to: ConnectionId, payload: String);

    async fn send_candidate(&self, to: ConnectionId, payload: String);
}
