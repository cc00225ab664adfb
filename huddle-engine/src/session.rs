use crate::transport::MediaTransport;
use huddle_core::ConnectionId;
use std::collections::VecDeque;
use thiserror::Error;
use tracing::{debug, warn};

/// Handshake progress for one peer link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegotiationState {
    Idle,
    OfferSent,
    OfferReceived,
    Answered,
    Connected,
    Closed,
}

#[derive(Debug, Error)]
pub enum NegotiationError {
    #[error("unexpected {event} in state {state:?}")]
    InvalidTransition {
        state: NegotiationState,
        event: &'static str,
    },

    #[error("transport failure: {0}")]
    Transport(#[from] anyhow::Error),
}

/// Negotiation state machine for the link to one remote participant.
///
/// The identity pair is fixed for the session's lifetime; renegotiation
/// allocates a fresh instance under the same pair. Candidates that arrive
/// before the remote description is applied are queued and flushed in
/// arrival order once it is.
pub struct PeerSession {
    local_id: ConnectionId,
    remote_id: ConnectionId,
    state: NegotiationState,
    remote_description_set: bool,
    pending_candidates: VecDeque<String>,
    transport: Box<dyn MediaTransport>,
}

impl PeerSession {
    pub fn new(
        local_id: ConnectionId,
        remote_id: ConnectionId,
        transport: Box<dyn MediaTransport>,
    ) -> Self {
        Self {
            local_id,
            remote_id,
            state: NegotiationState::Idle,
            remote_description_set: false,
            pending_candidates: VecDeque::new(),
            transport,
        }
    }

    pub fn local_id(&self) -> ConnectionId {
        self.local_id
    }

    pub fn remote_id(&self) -> ConnectionId {
        self.remote_id
    }

    pub fn state(&self) -> NegotiationState {
        self.state
    }

    pub fn queued_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Initiating side: build the offer to send through the relay.
    pub async fn initiate(&mut self) -> Result<String, NegotiationError> {
        self.expect(NegotiationState::Idle, "initiate")?;
        let offer = self.transport.create_offer().await?;
        self.state = NegotiationState::OfferSent;
        Ok(offer)
    }

    /// Responding side: apply the remote offer and build the answer to send
    /// back.
    pub async fn accept_offer(&mut self, payload: String) -> Result<String, NegotiationError> {
        self.expect(NegotiationState::Idle, "offer")?;
        self.state = NegotiationState::OfferReceived;

        self.transport.set_remote_description(payload).await?;
        self.remote_description_set = true;
        self.flush_pending().await?;

        let answer = self.transport.create_answer().await?;
        self.state = NegotiationState::Answered;
        Ok(answer)
    }

    /// Initiating side: the peer's answer arrived.
    pub async fn apply_answer(&mut self, payload: String) -> Result<(), NegotiationError> {
        self.expect(NegotiationState::OfferSent, "answer")?;

        self.transport.set_remote_description(payload).await?;
        self.remote_description_set = true;
        self.flush_pending().await?;

        self.state = NegotiationState::Answered;
        Ok(())
    }

    /// Candidates may arrive in any state and in any order relative to the
    /// offer/answer exchange; they are held until the transport can take
    /// them.
    pub async fn handle_candidate(&mut self, payload: String) -> Result<(), NegotiationError> {
        if self.state == NegotiationState::Closed {
            debug!("Dropping candidate for closed session with {}", self.remote_id);
            return Ok(());
        }

        if !self.remote_description_set {
            self.pending_candidates.push_back(payload);
            return Ok(());
        }

        self.transport.add_ice_candidate(payload).await?;
        Ok(())
    }

    /// Connectivity confirmation observed from the transport, not driven by
    /// the state machine.
    pub fn mark_connected(&mut self) {
        if self.state == NegotiationState::Answered {
            self.state = NegotiationState::Connected;
        }
    }

    /// Terminal. Discards any queued candidates and releases the transport.
    /// Idempotent.
    pub async fn close(&mut self) {
        if self.state == NegotiationState::Closed {
            return;
        }
        self.state = NegotiationState::Closed;
        self.pending_candidates.clear();

        if let Err(e) = self.transport.close().await {
            warn!("Error closing transport for {}: {e:?}", self.remote_id);
        }
    }

    async fn flush_pending(&mut self) -> Result<(), NegotiationError> {
        while let Some(candidate) = self.pending_candidates.pop_front() {
            self.transport.add_ice_candidate(candidate).await?;
        }
        Ok(())
    }

    fn expect(
        &self,
        state: NegotiationState,
        event: &'static str,
    ) -> Result<(), NegotiationError> {
        if self.state == state {
            Ok(())
        } else {
            Err(NegotiationError::InvalidTransition {
                state: self.state,
                event,
            })
        }
    }
}
