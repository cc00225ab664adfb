mod engine_event;
mod engine_handle;
mod orchestrator;
mod signal_sink;

pub use engine_event::*;
pub use engine_handle::*;
pub use orchestrator::*;
pub use signal_sink::*;
