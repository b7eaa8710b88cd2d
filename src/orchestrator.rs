use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep};
use tracing::{info, warn};

use crate::clipboard::SideChannel;
use crate::conversations;
use crate::error::{AutomationError, AutomationResult, RequestError};
use crate::pacing::{DEFAULT_MIN_INTERVAL, RateLimiter};
use crate::target::TargetApp;
use crate::transport::{InputTransport, TransportDelays};
use crate::watcher::{self, Baseline, WatchOutcome, WatchSettings};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorSettings {
    pub min_interval: Duration,
    pub launch_settle: Duration,
    pub post_submit: Duration,
    pub new_conversation_label: String,
    pub transport: TransportDelays,
    pub watch: WatchSettings,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            launch_settle: Duration::from_millis(2_000),
            post_submit: Duration::from_millis(1_000),
            new_conversation_label: "New chat".to_string(),
            transport: TransportDelays::default(),
            watch: WatchSettings::default(),
        }
    }
}

/// Runs ask and list operations against the target, one at a time.
///
/// The rate limiter sits behind an async mutex that is held for the whole
/// operation, so concurrent callers queue up and the clipboard snapshot and
/// restore of one call never interleaves with another.
pub struct Orchestrator<T, C> {
    target: T,
    clipboard: C,
    settings: OrchestratorSettings,
    limiter: Mutex<RateLimiter>,
}

impl<T, C> Orchestrator<T, C>
where
    T: TargetApp,
    C: SideChannel,
{
    pub fn new(target: T, clipboard: C, settings: OrchestratorSettings) -> Self {
        let limiter = Mutex::new(RateLimiter::new(settings.min_interval));
        Self {
            target,
            clipboard,
            settings,
            limiter,
        }
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// When the most recent prompt was dispatched, if ever.
    pub async fn last_dispatch(&self) -> Option<Instant> {
        self.limiter.lock().await.last_dispatch()
    }

    /// Makes sure the target is running, launching it if needed.
    pub async fn ensure_reachable(&self) -> AutomationResult<()> {
        let running = self
            .target
            .is_running()
            .await
            .map_err(|e| AutomationError::UnreachableTarget(e.to_string()))?;
        if running {
            return Ok(());
        }

        info!("target not running, launching");
        self.target.launch().await.map_err(|e| {
            AutomationError::UnreachableTarget(format!("could not launch target: {}", e))
        })?;
        sleep(self.settings.launch_settle).await;

        let running = self
            .target
            .is_running()
            .await
            .map_err(|e| AutomationError::UnreachableTarget(e.to_string()))?;
        if !running {
            return Err(AutomationError::UnreachableTarget(
                "target did not start after launch".to_string(),
            ));
        }
        Ok(())
    }

    /// Sends `prompt` and waits for the response to settle.
    ///
    /// A blank prompt is rejected before any pacing or target activity.
    pub async fn ask(
        &self,
        prompt: &str,
        conversation: Option<&str>,
        delay_override: Option<Duration>,
    ) -> AutomationResult<WatchOutcome> {
        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt.into());
        }

        let mut limiter = self.limiter.lock().await;
        self.ensure_reachable().await?;

        limiter.wait_for_slot(delay_override).await;
        limiter.record_dispatch();
        info!(conversation = conversation.unwrap_or("<current>"), "dispatching prompt");

        let transport = InputTransport::new(&self.target, &self.clipboard, self.settings.transport);
        transport.prepare(conversation).await?;
        let baseline = self.baseline(prompt).await;
        transport.deliver(prompt).await?;
        sleep(self.settings.post_submit).await;

        Ok(watcher::await_completion(&self.target, &self.settings.watch, &baseline).await)
    }

    /// Output already on screen, plus the prompt itself in case the target
    /// echoes it. Neither may be mistaken for the answer.
    async fn baseline(&self, prompt: &str) -> Baseline {
        let baseline = Baseline::new().with(prompt);
        match self.target.read_output().await {
            Ok(text) => baseline.with(&text),
            Err(e) => {
                warn!(error = %e, "could not read output before sending");
                baseline
            }
        }
    }

    /// Lists conversation labels. Listing problems come back as a sentinel entry.
    pub async fn list_conversations(&self) -> AutomationResult<Vec<String>> {
        let _turn = self.limiter.lock().await;
        self.ensure_reachable().await?;
        Ok(conversations::list(&self.target, &self.settings.new_conversation_label).await)
    }
}
