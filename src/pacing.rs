use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

/// Minimum spacing between two dispatched prompts unless a caller overrides it.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(120_000);

/// Wait-then-proceed gate that spaces out prompts sent to the target.
///
/// This is not a queue. The owner must hold it exclusively from
/// `wait_for_slot` through `record_dispatch` so overlapping callers serialize.
#[derive(Debug)]
pub struct RateLimiter {
    last_dispatch: Option<Instant>,
    default_interval: Duration,
}

impl RateLimiter {
    pub fn new(default_interval: Duration) -> Self {
        Self {
            last_dispatch: None,
            default_interval,
        }
    }

    pub fn last_dispatch(&self) -> Option<Instant> {
        self.last_dispatch
    }

    /// How long a caller would have to wait right now.
    pub fn required_wait(&self, override_interval: Option<Duration>) -> Duration {
        let interval = override_interval.unwrap_or(self.default_interval);
        match self.last_dispatch {
            Some(last) => interval.saturating_sub(last.elapsed()),
            None => Duration::ZERO,
        }
    }

    /// Suspends until the interval since the last dispatch has elapsed. Never fails.
    pub async fn wait_for_slot(&self, override_interval: Option<Duration>) {
        let wait = self.required_wait(override_interval);
        if wait.is_zero() {
            return;
        }
        debug!(wait_ms = wait.as_millis() as u64, "pacing next dispatch");
        sleep(wait).await;
    }

    /// Marks a dispatch as happening now. Call right after the slot is granted.
    pub fn record_dispatch(&mut self) {
        self.last_dispatch = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
