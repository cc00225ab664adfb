use crate::orchestrator::{EngineEvent, SessionInfo, SignalSink};
use crate::session::PeerSession;
use crate::transport::{TransportEvent, TransportFactory};
use huddle_core::{ConnectionId, Participant, normalize_identity};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Reacts to presence deltas by creating, tearing down, or renegotiating
/// peer sessions.
///
/// Policy: a direct link exists only between two participants who both have
/// audio enabled, and for each such pair exactly one side initiates: the
/// one whose case-normalized identity sorts first. Sessions are owned
/// exclusively by this event loop; nothing mutates them from outside it.
pub struct Orchestrator {
    local_id: ConnectionId,
    local_name: String,
    audio_enabled: bool,
    roster: HashMap<ConnectionId, Participant>,
    sessions: HashMap<ConnectionId, PeerSession>,
    factory: Arc<dyn TransportFactory>,
    signals: Arc<dyn SignalSink>,
    event_rx: mpsc::Receiver<EngineEvent>,
    transport_rx: mpsc::Receiver<TransportEvent>,
    transport_tx: mpsc::Sender<TransportEvent>,
}

impl Orchestrator {
    pub fn new(
        local_id: ConnectionId,
        local_name: impl Into<String>,
        audio_enabled: bool,
        factory: Arc<dyn TransportFactory>,
        signals: Arc<dyn SignalSink>,
        event_rx: mpsc::Receiver<EngineEvent>,
    ) -> Self {
        let (transport_tx, transport_rx) = mpsc::channel(256);

        Self {
            local_id,
            local_name: local_name.into(),
            audio_enabled,
            roster: HashMap::new(),
            sessions: HashMap::new(),
            factory,
            signals,
            event_rx,
            transport_rx,
            transport_tx,
        }
    }

    pub async fn run(mut self) {
        info!("Session orchestrator started for {}", self.local_id);

        loop {
            tokio::select! {
                evt = self.event_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_event(e).await,
                        None => break,
                    }
                }

                evt = self.transport_rx.recv() => {
                    match evt {
                        Some(e) => self.handle_transport_event(e).await,
                        None => {
                            warn!("Transport channel closed unexpectedly");
                            break;
                        }
                    }
                }
            }
        }

        self.close_all_sessions().await;
        info!("Session orchestrator finished for {}", self.local_id);
    }

    async fn handle_event(&mut self, event: EngineEvent) {
        match event {
            EngineEvent::RosterSnapshot(participants) => {
                self.roster = participants
                    .into_iter()
                    .filter(|p| p.id != self.local_id)
                    .map(|p| (p.id, p))
                    .collect();

                if self.audio_enabled {
                    self.initiate_qualifying().await;
                }
            }

            EngineEvent::PeerJoined(participant) => {
                if participant.id == self.local_id {
                    return;
                }
                let should_initiate = self.audio_enabled
                    && participant.audio_enabled
                    && self.initiates_toward(&participant);
                let id = participant.id;
                self.roster.insert(id, participant);

                if should_initiate {
                    self.open_session(id).await;
                }
            }

            EngineEvent::PeerUpdated { id, audio_enabled } => {
                let Some(participant) = self.roster.get_mut(&id) else {
                    debug!("Update for unknown participant {id}");
                    return;
                };
                let was_enabled = participant.audio_enabled;
                participant.audio_enabled = audio_enabled;
                let peer = participant.clone();

                if !was_enabled && audio_enabled {
                    if self.audio_enabled && self.initiates_toward(&peer) {
                        self.open_session(id).await;
                    }
                } else if was_enabled && !audio_enabled {
                    self.close_session(id).await;
                }
            }

            EngineEvent::PeerLeft(id) => {
                self.roster.remove(&id);
                self.close_session(id).await;
            }

            EngineEvent::Offer { from, payload } => {
                self.handle_offer(from, payload).await;
            }

            EngineEvent::Answer { from, payload } => {
                let Some(session) = self.sessions.get_mut(&from) else {
                    debug!("Stray answer from {from}");
                    return;
                };
                if let Err(e) = session.apply_answer(payload).await {
                    error!("Failed to apply answer from {from}: {e}");
                    self.close_session(from).await;
                }
            }

            EngineEvent::Candidate { from, payload } => {
                let Some(session) = self.sessions.get_mut(&from) else {
                    // The session may already be gone; candidates are
                    // transient and safe to drop.
                    debug!("Candidate for unknown session {from}");
                    return;
                };
                if let Err(e) = session.handle_candidate(payload).await {
                    error!("Failed to apply candidate from {from}: {e}");
                    self.close_session(from).await;
                }
            }

            EngineEvent::LocalAudio(enabled) => {
                if enabled == self.audio_enabled {
                    return;
                }
                self.audio_enabled = enabled;

                if enabled {
                    // All prior sessions were torn down when audio went
                    // off, so nothing old survives into the new round.
                    self.initiate_qualifying().await;
                } else {
                    self.close_all_sessions().await;
                }
            }

            EngineEvent::Inspect { reply } => {
                let infos = self
                    .sessions
                    .values()
                    .map(|s| SessionInfo {
                        remote_id: s.remote_id(),
                        state: s.state(),
                    })
                    .collect();
                let _ = reply.send(infos);
            }
        }
    }

    async fn handle_transport_event(&mut self, event: TransportEvent) {
        match event {
            TransportEvent::CandidateGenerated(remote, payload) => {
                if !self.sessions.contains_key(&remote) {
                    debug!("Dropping candidate for closed session with {remote}");
                    return;
                }
                self.signals.send_candidate(remote, payload).await;
            }

            TransportEvent::ConnectionEstablished(remote) => {
                if let Some(session) = self.sessions.get_mut(&remote) {
                    session.mark_connected();
                    info!("Peer link with {remote} connected");
                }
            }

            TransportEvent::ConnectionLost(remote) => {
                warn!("Transport for {remote} reported permanent failure");
                self.close_session(remote).await;
            }
        }
    }

    async fn handle_offer(&mut self, from: ConnectionId, payload: String) {
        if !self.audio_enabled {
            debug!("Ignoring offer from {from} while audio is disabled");
            return;
        }
        if !self.roster.contains_key(&from) {
            debug!("Offer from unknown participant {from}");
            return;
        }

        // A live session under the same pair means the peer renegotiated:
        // tear the old instance down and build a fresh one, never reuse.
        if self.sessions.contains_key(&from) {
            info!("Renegotiation requested by {from}");
            self.close_session(from).await;
        }

        let transport = match self.factory.create(from, self.transport_tx.clone()).await {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create transport for {from}: {e:?}");
                return;
            }
        };

        let mut session = PeerSession::new(self.local_id, from, transport);
        match session.accept_offer(payload).await {
            Ok(answer) => {
                self.signals.send_answer(from, answer).await;
                self.sessions.insert(from, session);
            }
            Err(e) => {
                error!("Failed to answer offer from {from}: {e}");
                session.close().await;
            }
        }
    }

    /// Initiate toward every audio-enabled peer this side wins the
    /// tie-break for.
    async fn initiate_qualifying(&mut self) {
        let targets: Vec<ConnectionId> = self
            .roster
            .values()
            .filter(|p| p.audio_enabled && self.initiates_toward(p))
            .map(|p| p.id)
            .collect();

        for id in targets {
            self.open_session(id).await;
        }
    }

    async fn open_session(&mut self, remote: ConnectionId) {
        if self.sessions.contains_key(&remote) {
            debug!("Session with {remote} already exists");
            return;
        }

        let transport = match self.factory.create(remote, self.transport_tx.clone()).await {
            Ok(t) => t,
            Err(e) => {
                error!("Failed to create transport for {remote}: {e:?}");
                return;
            }
        };

        let mut session = PeerSession::new(self.local_id, remote, transport);
        match session.initiate().await {
            Ok(offer) => {
                self.signals.send_offer(remote, offer).await;
                self.sessions.insert(remote, session);
            }
            Err(e) => {
                // Not retried here; the next qualifying presence event
                // starts over with a fresh instance.
                error!("Offer construction failed for {remote}: {e}");
                session.close().await;
            }
        }
    }

    async fn close_session(&mut self, remote: ConnectionId) {
        if let Some(mut session) = self.sessions.remove(&remote) {
            session.close().await;
        }
    }

    async fn close_all_sessions(&mut self) {
        let sessions: Vec<PeerSession> = self.sessions.drain().map(|(_, s)| s).collect();
        for mut session in sessions {
            session.close().await;
        }
    }

    /// Deterministic initiator tie-break: identities are unique after case
    /// folding, so exactly one side of each pair sorts first.
    fn initiates_toward(&self, peer: &Participant) -> bool {
        normalize_identity(&self.local_name) < peer.identity_key()
    }
}
