use async_trait::async_trait;
use huddle_core::{ConnectionId, ServerMessage};

/// Delivery seam between the presence registry and the transport layer.
///
/// Delivery is fire-and-forget per consumer: implementations must not block
/// the registry on a slow receiver.
#[async_trait]
pub trait Outbound: Send + Sync {
    async fn deliver(&self, to: ConnectionId, msg: ServerMessage);
}
