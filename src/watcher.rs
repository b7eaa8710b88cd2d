use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

use crate::target::TargetApp;

/// Returned when the response never produced any text before the deadline.
pub const TIMEOUT_MESSAGE: &str = "Timeout: no response received within the time limit.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSettings {
    pub poll_interval: Duration,
    /// Consecutive unchanged, non-empty samples needed to call a response done.
    pub required_stable_samples: u32,
    pub max_wait: Duration,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(3_000),
            required_stable_samples: 3,
            max_wait: Duration::from_millis(120_000),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Growing,
    Stabilizing(u32),
    Done,
}

/// One poll of the output surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchSample {
    pub length: usize,
    pub stable_count: u32,
    pub elapsed: Duration,
}

/// Length-stability rule, independent of time and I/O.
#[derive(Debug, Clone)]
pub struct StabilityTracker {
    required: u32,
    previous_len: usize,
    stable: u32,
    state: WatchState,
}

impl StabilityTracker {
    pub fn new(required: u32) -> Self {
        Self {
            required: required.max(1),
            previous_len: 0,
            stable: 0,
            state: WatchState::Growing,
        }
    }

    pub fn state(&self) -> WatchState {
        self.state
    }

    pub fn stable_count(&self) -> u32 {
        self.stable
    }

    /// Feeds one observed length and returns the resulting state.
    ///
    /// An empty output never counts as stable, so a response that has not
    /// started yet cannot complete.
    pub fn observe(&mut self, len: usize) -> WatchState {
        if self.state == WatchState::Done {
            return WatchState::Done;
        }

        if len != self.previous_len {
            self.previous_len = len;
            self.stable = 0;
            self.state = WatchState::Growing;
        } else if len > 0 {
            self.stable += 1;
            self.state = if self.stable >= self.required {
                WatchState::Done
            } else {
                WatchState::Stabilizing(self.stable)
            };
        }

        self.state
    }
}

/// Text that was already on the output surface when the prompt went out.
///
/// The target keeps showing the previous answer, or an echo of the prompt,
/// until generation starts. Samples equal to any baseline entry count as
/// empty so they can neither settle nor be returned as the answer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Baseline {
    stale: Vec<String>,
}

impl Baseline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one known-stale text. Blank text is ignored.
    pub fn with(mut self, text: &str) -> Self {
        let text = text.trim();
        if !text.is_empty() && !self.is_stale(text) {
            self.stale.push(text.to_string());
        }
        self
    }

    pub fn is_stale(&self, text: &str) -> bool {
        let text = text.trim();
        self.stale.iter().any(|stale| stale == text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    Complete(String),
    /// Deadline passed. Carries the last non-empty text seen, if any.
    TimedOut { partial: Option<String> },
}

impl WatchOutcome {
    pub fn is_complete(&self) -> bool {
        matches!(self, WatchOutcome::Complete(_))
    }

    pub fn into_text(self) -> String {
        match self {
            WatchOutcome::Complete(text) => text,
            WatchOutcome::TimedOut { partial: Some(text) } => text,
            WatchOutcome::TimedOut { partial: None } => TIMEOUT_MESSAGE.to_string(),
        }
    }
}

/// Polls the target's output until it stops growing or `max_wait` runs out.
///
/// Each tick sleeps first, then samples. The last sleep is cut short so no
/// sample lands after the deadline. A failed read is skipped and does not
/// disturb the stability count.
pub async fn await_completion<T>(
    target: &T,
    settings: &WatchSettings,
    baseline: &Baseline,
) -> WatchOutcome
where
    T: TargetApp + ?Sized,
{
    let start = Instant::now();
    let mut tracker = StabilityTracker::new(settings.required_stable_samples);
    let mut last_seen: Option<String> = None;

    while start.elapsed() < settings.max_wait {
        let remaining = settings.max_wait.saturating_sub(start.elapsed());
        sleep(settings.poll_interval.min(remaining)).await;

        let text = match target.read_output().await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "failed to read response, skipping sample");
                continue;
            }
        };

        let length = if baseline.is_stale(&text) {
            0
        } else {
            text.chars().count()
        };
        let state = tracker.observe(length);
        let sample = WatchSample {
            length,
            stable_count: tracker.stable_count(),
            elapsed: start.elapsed(),
        };
        debug!(?sample, ?state, "response sample");

        if length > 0 {
            last_seen = Some(text);
        }

        if state == WatchState::Done {
            info!(
                length,
                elapsed_ms = sample.elapsed.as_millis() as u64,
                "response complete"
            );
            return WatchOutcome::Complete(last_seen.unwrap_or_default());
        }
    }

    warn!(
        max_wait_ms = settings.max_wait.as_millis() as u64,
        partial = last_seen.is_some(),
        "response did not settle before timeout"
    );
    WatchOutcome::TimedOut { partial: last_seen }
}
