#![allow(dead_code)]

pub use runwatch_test_utils::builders;
pub use runwatch_test_utils::fake_transport;
pub use runwatch_test_utils::{init_tracing, with_timeout};

use runwatch::engine::SessionEvent;
use tokio::sync::mpsc;

/// Drain whatever events are currently queued.
pub fn drain(rx: &mut mpsc::UnboundedReceiver<SessionEvent>) -> Vec<SessionEvent> {
    let mut out = Vec::new();
    while let Ok(event) = rx.try_recv() {
        out.push(event);
    }
    out
}

/// Only the `LogLine` payloads, in order.
pub fn log_lines(events: &[SessionEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            SessionEvent::LogLine { line, .. } => Some(line.clone()),
            _ => None,
        })
        .collect()
}
