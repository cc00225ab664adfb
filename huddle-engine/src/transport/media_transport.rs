use crate::transport::TransportEvent;
use anyhow::Result;
use async_trait::async_trait;
use huddle_core::ConnectionId;
use tokio::sync::mpsc;

/// Opaque media-transport capability a peer session drives.
///
/// Offer/answer/candidate payloads are opaque strings end to end; only the
/// implementation knows their encoding. Connection-state changes and locally
/// gathered candidates come back as [`TransportEvent`]s on the channel wired
/// in by the factory.
#[async_trait]
pub trait MediaTransport: Send + Sync {
    /// Build the local offer and install it as the local description.
    async fn create_offer(&self) -> Result<String>;

    /// Build the local answer. The remote offer must have been applied via
    /// [`set_remote_description`](Self::set_remote_description) first.
    async fn create_answer(&self) -> Result<String>;

    async fn set_remote_description(&self, payload: String) -> Result<()>;

    async fn add_ice_candidate(&self, payload: String) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// Creates one transport per peer link, wiring its observations into the
/// owning orchestrator's event channel.
#[async_trait]
pub trait TransportFactory: Send + Sync {
    async fn create(
        &self,
        remote: ConnectionId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn MediaTransport>>;
}
