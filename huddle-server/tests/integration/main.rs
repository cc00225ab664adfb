mod registry_tests;

use crate::utils::MockOutbound;
use huddle_server::RosterHandle;
use std::sync::Arc;
use tracing::Level;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(Level::DEBUG)
        .with_test_writer()
        .try_init();
}

pub fn create_test_roster() -> (RosterHandle, MockOutbound) {
    let outbound = MockOutbound::new();
    let roster = RosterHandle::spawn(Arc::new(outbound.clone()));
    (roster, outbound)
}
