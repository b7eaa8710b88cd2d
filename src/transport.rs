use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::clipboard::{ClipboardGuard, SideChannel};
use crate::conversations;
use crate::error::{AutomationError, AutomationResult};
use crate::target::TargetApp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportDelays {
    pub activate_settle: Duration,
    pub conversation_settle: Duration,
}

impl Default for TransportDelays {
    fn default() -> Self {
        Self {
            activate_settle: Duration::from_millis(1_000),
            conversation_settle: Duration::from_millis(1_000),
        }
    }
}

/// Time the target gets to ingest pasted text: one millisecond per
/// character, never less than a second.
pub fn ingest_delay(text: &str) -> Duration {
    Duration::from_millis(text.chars().count() as u64).max(Duration::from_secs(1))
}

/// Delivers prompts through the clipboard instead of synthetic keystrokes.
pub struct InputTransport<'a, T: ?Sized, C: ?Sized> {
    target: &'a T,
    clipboard: &'a C,
    delays: TransportDelays,
}

impl<'a, T, C> InputTransport<'a, T, C>
where
    T: TargetApp + ?Sized,
    C: SideChannel + ?Sized,
{
    pub fn new(target: &'a T, clipboard: &'a C, delays: TransportDelays) -> Self {
        Self {
            target,
            clipboard,
            delays,
        }
    }

    /// Types `text` into the target's input field and submits it.
    ///
    /// Whatever the clipboard held beforehand is put back on every path,
    /// including when focusing or pasting fails.
    pub async fn send(&self, text: &str, conversation: Option<&str>) -> AutomationResult<()> {
        self.prepare(conversation).await?;
        self.deliver(text).await
    }

    /// Brings the target forward and switches to `conversation` if given.
    pub async fn prepare(&self, conversation: Option<&str>) -> AutomationResult<()> {
        self.target.activate().await.map_err(|e| {
            AutomationError::UnreachableTarget(format!("could not bring target to front: {}", e))
        })?;
        sleep(self.delays.activate_settle).await;

        if let Some(reference) = conversation {
            conversations::select(self.target, reference, self.delays.conversation_settle).await;
        }
        Ok(())
    }

    /// Pastes `text` through the clipboard and submits it. Expects `prepare`
    /// to have run.
    pub async fn deliver(&self, text: &str) -> AutomationResult<()> {
        let guard = ClipboardGuard::take(self.clipboard)
            .map_err(|e| AutomationError::InputDelivery(e.to_string()))?;
        self.clipboard
            .write(text)
            .map_err(|e| AutomationError::InputDelivery(e.to_string()))?;

        let delivered = self.paste_and_submit(text).await;

        if let Err(e) = guard.restore() {
            warn!(error = %e, "clipboard restore failed after sending prompt");
        }

        delivered?;
        info!(chars = text.chars().count(), "prompt submitted");
        Ok(())
    }

    async fn paste_and_submit(&self, text: &str) -> AutomationResult<()> {
        self.target.focus_input().await.map_err(|e| {
            AutomationError::InputDelivery(format!("could not focus input field: {}", e))
        })?;
        self.target
            .paste()
            .await
            .map_err(|e| AutomationError::InputDelivery(format!("paste failed: {}", e)))?;

        let wait = ingest_delay(text);
        debug!(wait_ms = wait.as_millis() as u64, "waiting for pasted text to land");
        sleep(wait).await;

        self.target
            .submit()
            .await
            .map_err(|e| AutomationError::InputDelivery(format!("submit failed: {}", e)))
    }
}
