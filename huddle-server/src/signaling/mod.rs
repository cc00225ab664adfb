mod outbound;
mod signaling_service;
mod ws_handler;

pub use outbound::*;
pub use signaling_service::*;
pub use ws_handler::*;
