use crate::orchestrator::{EngineEvent, Orchestrator, SessionInfo, SignalSink};
use crate::transport::TransportFactory;
use huddle_core::{ConnectionId, Participant, ServerMessage};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Cloneable front for one running orchestrator task.
#[derive(Clone)]
pub struct EngineHandle {
    event_tx: mpsc::Sender<EngineEvent>,
}

impl EngineHandle {
    /// Spawn an orchestrator for the local participant and return a handle
    /// feeding its event loop.
    pub fn spawn(
        local_id: ConnectionId,
        local_name: impl Into<String>,
        audio_enabled: bool,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        let orchestrator = Orchestrator::new(
            local_id,
            local_name,
            audio_enabled,
            factory,
            signals,
            event_rx,
        );
        tokio::spawn(orchestrator.run());
        Self { event_tx }
    }

    /// Feed one relay message into the engine. Non-presence,
    /// non-negotiation traffic is ignored here.
    pub async fn apply_server_message(&self, msg: ServerMessage) {
        match msg {
            ServerMessage::Joined { roster } => self.roster_snapshot(roster).await,
            ServerMessage::ParticipantJoined { participant } => self.peer_joined(participant).await,
            ServerMessage::ParticipantUpdated { id, audio_enabled } => {
                self.peer_updated(id, audio_enabled).await
            }
            ServerMessage::ParticipantLeft { id } => self.peer_left(id).await,
            ServerMessage::Offer { from, payload } => self.offer(from, payload).await,
            ServerMessage::Answer { from, payload } => self.answer(from, payload).await,
            ServerMessage::IceCandidate { from, payload } => self.candidate(from, payload).await,
            _ => {}
        }
    }

    pub async fn roster_snapshot(&self, participants: Vec<Participant>) {
        self.send(EngineEvent::RosterSnapshot(participants)).await;
    }

    pub async fn peer_joined(&self, participant: Participant) {
        self.send(EngineEvent::PeerJoined(participant)).await;
    }

    pub async fn peer_updated(&self, id: ConnectionId, audio_enabled: bool) {
        self.send(EngineEvent::PeerUpdated { id, audio_enabled }).await;
    }

    pub async fn peer_left(&self, id: ConnectionId) {
        self.send(EngineEvent::PeerLeft(id)).await;
    }

    pub async fn offer(&self, from: ConnectionId, payload: String) {
        self.send(EngineEvent::Offer { from, payload }).await;
    }

    pub async fn answer(&self, from: ConnectionId, payload: String) {
        self.send(EngineEvent::Answer { from, payload }).await;
    }

    pub async fn candidate(&self, from: ConnectionId, payload: String) {
        self.send(EngineEvent::Candidate { from, payload }).await;
    }

    pub async fn set_local_audio(&self, enabled: bool) {
        self.send(EngineEvent::LocalAudio(enabled)).await;
    }

    pub async fn inspect(&self) -> Vec<SessionInfo> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineEvent::Inspect { reply }).await;
        rx.await.unwrap_or_default()
    }

    async fn send(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event).await;
    }
}
