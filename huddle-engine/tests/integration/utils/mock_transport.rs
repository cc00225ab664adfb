use anyhow::{Result, bail};
use async_trait::async_trait;
use huddle_core::ConnectionId;
use huddle_engine::{MediaTransport, TransportEvent, TransportFactory};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::{Mutex, mpsc};

/// What the orchestrator did to which transport, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    CreateOffer(ConnectionId),
    CreateAnswer(ConnectionId),
    SetRemoteDescription(ConnectionId, String),
    AddIceCandidate(ConnectionId, String),
    Close(ConnectionId),
}

/// Factory handing out scripted transports that record every call into one
/// shared log, so cross-session ordering can be asserted.
#[derive(Clone, Default)]
pub struct MockTransportFactory {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    fail_offers: Arc<AtomicBool>,
    event_taps: Arc<Mutex<Vec<(ConnectionId, mpsc::Sender<TransportEvent>)>>>,
}

impl MockTransportFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent offer constructions fail, as a refusing capability
    /// would.
    pub fn fail_offers(&self, fail: bool) {
        self.fail_offers.store(fail, Ordering::SeqCst);
    }

    pub async fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().await.clone()
    }

    pub async fn candidates_added_to(&self, remote: ConnectionId) -> Vec<String> {
        self.calls
            .lock()
            .await
            .iter()
            .filter_map(|c| match c {
                TransportCall::AddIceCandidate(id, payload) if *id == remote => {
                    Some(payload.clone())
                }
                _ => None,
            })
            .collect()
    }

    pub async fn close_count(&self, remote: ConnectionId) -> usize {
        self.calls
            .lock()
            .await
            .iter()
            .filter(|c| matches!(c, TransportCall::Close(id) if *id == remote))
            .count()
    }

    /// Inject a transport observation as if the media plane reported it.
    /// Renegotiation replaces the transport, so the newest tap for the
    /// remote wins.
    pub async fn emit(&self, event: TransportEvent) {
        let remote = match &event {
            TransportEvent::CandidateGenerated(id, _) => *id,
            TransportEvent::ConnectionEstablished(id) => *id,
            TransportEvent::ConnectionLost(id) => *id,
        };

        let taps = self.event_taps.lock().await;
        let Some((_, tx)) = taps.iter().rev().find(|(id, _)| *id == remote) else {
            panic!("no transport was ever created for {remote}");
        };
        let _ = tx.send(event).await;
    }
}

#[async_trait]
impl TransportFactory for MockTransportFactory {
    async fn create(
        &self,
        remote: ConnectionId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn MediaTransport>> {
        self.event_taps.lock().await.push((remote, events));

        Ok(Box::new(MockTransport {
            remote,
            calls: self.calls.clone(),
            fail_offers: self.fail_offers.clone(),
        }))
    }
}

pub struct MockTransport {
    remote: ConnectionId,
    calls: Arc<Mutex<Vec<TransportCall>>>,
    fail_offers: Arc<AtomicBool>,
}

impl MockTransport {
    async fn record(&self, call: TransportCall) {
        self.calls.lock().await.push(call);
    }
}

#[async_trait]
impl MediaTransport for MockTransport {
    async fn create_offer(&self) -> Result<String> {
        if self.fail_offers.load(Ordering::SeqCst) {
            bail!("offer construction refused");
        }
        self.record(TransportCall::CreateOffer(self.remote)).await;
        Ok(format!("offer-for-{}", self.remote))
    }

    async fn create_answer(&self) -> Result<String> {
        self.record(TransportCall::CreateAnswer(self.remote)).await;
        Ok(format!("answer-for-{}", self.remote))
    }

    async fn set_remote_description(&self, payload: String) -> Result<()> {
        self.record(TransportCall::SetRemoteDescription(self.remote, payload))
            .await;
        Ok(())
    }

    async fn add_ice_candidate(&self, payload: String) -> Result<()> {
        self.record(TransportCall::AddIceCandidate(self.remote, payload))
            .await;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.record(TransportCall::Close(self.remote)).await;
        Ok(())
    }
}
