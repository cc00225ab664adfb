pub mod roster;
pub mod signaling;

pub use roster::{RegistryError, RosterCommand, RosterHandle};
pub use signaling::{Outbound, SignalingService, ws_handler};

use axum::Router;
use axum::routing::get;

/// Shared state for the WebSocket endpoint.
#[derive(Clone)]
pub struct AppState {
    pub signaling: SignalingService,
    pub roster: RosterHandle,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/ws", get(ws_handler))
        .with_state(state)
}
