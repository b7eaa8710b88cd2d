#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use deskprompt::clipboard::MemoryClipboard;
use deskprompt::orchestrator::{Orchestrator, OrchestratorSettings};
use deskprompt::server::ToolHandler;
use deskprompt::target::FakeTarget;
use deskprompt::transport::TransportDelays;
use deskprompt::watcher::WatchSettings;

/// Settings with every fixed delay removed and a fast poll loop.
pub fn fast_settings(min_interval_ms: u64) -> OrchestratorSettings {
    OrchestratorSettings {
        min_interval: Duration::from_millis(min_interval_ms),
        launch_settle: Duration::from_millis(50),
        post_submit: Duration::ZERO,
        new_conversation_label: "New chat".to_string(),
        transport: TransportDelays {
            activate_settle: Duration::ZERO,
            conversation_settle: Duration::ZERO,
        },
        watch: WatchSettings {
            poll_interval: Duration::from_millis(10),
            required_stable_samples: 3,
            max_wait: Duration::from_millis(500),
        },
    }
}

/// Orchestrator whose clipboard is shared with the target, so pastes record
/// exactly what was on the clipboard.
pub fn create_orchestrator(
    target: FakeTarget,
    clipboard: Arc<MemoryClipboard>,
    min_interval_ms: u64,
) -> Orchestrator<FakeTarget, Arc<MemoryClipboard>> {
    Orchestrator::new(
        target.observing(clipboard.clone()),
        clipboard,
        fast_settings(min_interval_ms),
    )
}

pub fn create_handler(target: FakeTarget) -> ToolHandler<FakeTarget, Arc<MemoryClipboard>> {
    let clipboard = Arc::new(MemoryClipboard::with_content("user clipboard"));
    ToolHandler::new(create_orchestrator(target, clipboard, 200), "0.1.0-test")
}
