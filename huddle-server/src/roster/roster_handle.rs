use crate::roster::{RegistryError, Roster, RosterCommand};
use crate::signaling::Outbound;
use huddle_core::{ConnectionId, Participant};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tracing::error;

/// Cloneable front for the presence registry task.
#[derive(Clone)]
pub struct RosterHandle {
    command_tx: mpsc::Sender<RosterCommand>,
}

impl RosterHandle {
    /// Spawn the registry actor and return a handle to it.
    pub fn spawn(outbound: Arc<dyn Outbound>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(256);
        let roster = Roster::new(command_rx, outbound);
        tokio::spawn(roster.run());
        Self { command_tx }
    }

    pub async fn validate_name(&self, name: impl Into<String>) -> bool {
        let (reply, rx) = oneshot::channel();
        let cmd = RosterCommand::ValidateName {
            name: name.into(),
            reply,
        };
        if self.command_tx.send(cmd).await.is_err() {
            error!("Presence registry is gone; rejecting name validation");
            return false;
        }
        rx.await.unwrap_or(false)
    }

    pub async fn join(
        &self,
        id: ConnectionId,
        name: impl Into<String>,
        audio_enabled: bool,
    ) -> Result<Vec<Participant>, RegistryError> {
        let (reply, rx) = oneshot::channel();
        let cmd = RosterCommand::Join {
            id,
            name: name.into(),
            audio_enabled,
            reply,
        };
        if self.command_tx.send(cmd).await.is_err() {
            return Err(RegistryError::Closed);
        }
        rx.await.unwrap_or(Err(RegistryError::Closed))
    }

    pub async fn set_audio(&self, id: ConnectionId, audio_enabled: bool) {
        let _ = self
            .command_tx
            .send(RosterCommand::SetAudio { id, audio_enabled })
            .await;
    }

    pub async fn leave(&self, id: ConnectionId) {
        let _ = self.command_tx.send(RosterCommand::Leave { id }).await;
    }

    pub async fn snapshot(&self) -> Vec<Participant> {
        let (reply, rx) = oneshot::channel();
        if self
            .command_tx
            .send(RosterCommand::Snapshot { reply })
            .await
            .is_err()
        {
            return Vec::new();
        }
        rx.await.unwrap_or_default()
    }
}
