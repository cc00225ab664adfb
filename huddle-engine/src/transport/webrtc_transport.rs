use crate::transport::{MediaTransport, TransportConfig, TransportEvent, TransportFactory};
use anyhow::{Context, Result};
use async_trait::async_trait;
use huddle_core::ConnectionId;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::info;
use webrtc::api::APIBuilder;
use webrtc::api::interceptor_registry::register_default_interceptors;
use webrtc::api::media_engine::MediaEngine;
use webrtc::ice_transport::ice_candidate::{RTCIceCandidate, RTCIceCandidateInit};
use webrtc::ice_transport::ice_server::RTCIceServer;
use webrtc::interceptor::registry::Registry;
use webrtc::peer_connection::RTCPeerConnection;
use webrtc::peer_connection::configuration::RTCConfiguration;
use webrtc::peer_connection::peer_connection_state::RTCPeerConnectionState;
use webrtc::peer_connection::sdp::session_description::RTCSessionDescription;

/// Builds [`WebRtcTransport`]s over the `webrtc` crate.
pub struct WebRtcFactory {
    config: TransportConfig,
}

impl WebRtcFactory {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl TransportFactory for WebRtcFactory {
    async fn create(
        &self,
        remote: ConnectionId,
        events: mpsc::Sender<TransportEvent>,
    ) -> Result<Box<dyn MediaTransport>> {
        let mut media = MediaEngine::default();
        media.register_default_codecs()?;
        let registry = register_default_interceptors(Registry::new(), &mut media)?;

        let api = APIBuilder::new()
            .with_media_engine(media)
            .with_interceptor_registry(registry)
            .build();

        let ice_servers = self
            .config
            .ice_servers
            .iter()
            .map(|s| RTCIceServer {
                urls: s.urls.clone(),
                username: s.username.clone().unwrap_or_default(),
                credential: s.credential.clone().unwrap_or_default(),
            })
            .collect();

        let rtc_config = RTCConfiguration {
            ice_servers,
            ..Default::default()
        };

        let peer_connection = Arc::new(api.new_peer_connection(rtc_config).await?);

        // Connectivity observations for the orchestrator. The closures must
        // be 'static, hence the per-callback clones.
        let state_tx = events.clone();
        let state_remote = remote;
        peer_connection.on_peer_connection_state_change(Box::new(
            move |s: RTCPeerConnectionState| {
                let tx = state_tx.clone();

                Box::pin(async move {
                    info!("Peer connection state for {state_remote}: {s:?}");
                    match s {
                        RTCPeerConnectionState::Connected => {
                            let _ = tx
                                .send(TransportEvent::ConnectionEstablished(state_remote))
                                .await;
                        }
                        RTCPeerConnectionState::Failed
                        | RTCPeerConnectionState::Disconnected
                        | RTCPeerConnectionState::Closed => {
                            let _ = tx.send(TransportEvent::ConnectionLost(state_remote)).await;
                        }
                        _ => {}
                    }
                })
            },
        ));

        // Trickle ICE: locally gathered candidates go out through the relay.
        let ice_tx = events.clone();
        let ice_remote = remote;
        peer_connection.on_ice_candidate(Box::new(move |c: Option<RTCIceCandidate>| {
            let tx = ice_tx.clone();

            Box::pin(async move {
                let Some(candidate) = c else { return };
                let Ok(init) = candidate.to_json() else {
                    return;
                };
                let Ok(payload) = serde_json::to_string(&init) else {
                    return;
                };
                let _ = tx
                    .send(TransportEvent::CandidateGenerated(ice_remote, payload))
                    .await;
            })
        }));

        Ok(Box::new(WebRtcTransport {
            remote,
            peer_connection,
        }))
    }
}

/// [`MediaTransport`] over one `RTCPeerConnection`.
///
/// Payloads are the serde JSON of the session description / candidate init,
/// so they carry their own SDP type and stay opaque to the rest of the
/// engine.
pub struct WebRtcTransport {
    remote: ConnectionId,
    peer_connection: Arc<RTCPeerConnection>,
}

#[async_trait]
impl MediaTransport for WebRtcTransport {
    async fn create_offer(&self) -> Result<String> {
        let offer = self.peer_connection.create_offer(None).await?;
        self.peer_connection
            .set_local_description(offer.clone())
            .await?;
        serde_json::to_string(&offer).context("Failed to serialize offer")
    }

    async fn create_answer(&self) -> Result<String> {
        let answer = self.peer_connection.create_answer(None).await?;
        self.peer_connection
            .set_local_description(answer.clone())
            .await?;
        serde_json::to_string(&answer).context("Failed to serialize answer")
    }

    async fn set_remote_description(&self, payload: String) -> Result<()> {
        let desc: RTCSessionDescription = serde_json::from_str(&payload)
            .with_context(|| format!("Bad session description from {}", self.remote))?;
        self.peer_connection.set_remote_description(desc).await?;
        Ok(())
    }

    async fn add_ice_candidate(&self, payload: String) -> Result<()> {
        let candidate: RTCIceCandidateInit = serde_json::from_str(&payload)
            .with_context(|| format!("Bad ICE candidate from {}", self.remote))?;
        self.peer_connection.add_ice_candidate(candidate).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peer_connection.close().await?;
        Ok(())
    }
}
