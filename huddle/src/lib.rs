pub use huddle_core::{ConnectionId, Participant};

pub mod model {
    pub use huddle_core::model::*;
}

#[cfg(feature = "server")]
pub mod server {
    pub use huddle_server::*;
}

#[cfg(feature = "engine")]
pub mod engine {
    pub use huddle_engine::*;
}
