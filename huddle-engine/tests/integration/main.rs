
use huddle_core::ConnectionId;
use huddle_engine::{EngineHandle, NegotiationState};
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

/// Poll until the session with `remote` reaches `state`.
pub async fn wait_for_state(
    handle: &EngineHandle,
    remote: ConnectionId,
    state: NegotiationState,
    timeout_ms: u64,
) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    loop {
        let hit = handle
            .inspect()
            .await
            .iter()
            .any(|s| s.remote_id == remote && s.state == state);
        if hit {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}

/// Poll until no session with `remote` remains.
pub async fn wait_for_closed(handle: &EngineHandle, remote: ConnectionId, timeout_ms: u64) -> bool {
    let start = std::time::Instant::now();
    let timeout = std::time::Duration::from_millis(timeout_ms);

    loop {
        if !handle.inspect().await.iter().any(|s| s.remote_id == remote) {
            return true;
        }
        if start.elapsed() > timeout {
            return false;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
}
