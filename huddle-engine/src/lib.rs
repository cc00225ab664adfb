pub mod orchestrator;
pub mod session;
pub mod transport;

pub use orchestrator::{EngineEvent, EngineHandle, Orchestrator, SessionInfo, SignalSink};
pub use session::{NegotiationError, NegotiationState, PeerSession};
pub use transport::{
    MediaTransport, TransportConfig, TransportEvent, TransportFactory, WebRtcFactory,
};
