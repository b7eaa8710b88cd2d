// Capabilities of the automated application.
// Element addressing lives in the backends; the core only sees these calls.

pub mod fake;
pub mod osascript;

use async_trait::async_trait;

use crate::error::AutomationResult;

pub use fake::{FakeTarget, TargetEvent};
pub use osascript::OsaScriptApp;

/// Everything the orchestration layer needs from the target application.
#[async_trait]
pub trait TargetApp: Send + Sync {
    /// Whether the application process currently exists.
    async fn is_running(&self) -> AutomationResult<bool>;

    /// Starts the application without waiting for it to settle.
    async fn launch(&self) -> AutomationResult<()>;

    /// Brings the application to the front.
    async fn activate(&self) -> AutomationResult<()>;

    /// Gives keyboard focus to the prompt input field.
    async fn focus_input(&self) -> AutomationResult<()>;

    /// Pastes the clipboard into the focused field.
    async fn paste(&self) -> AutomationResult<()>;

    /// Presses the send action.
    async fn submit(&self) -> AutomationResult<()>;

    /// Text of the latest response currently rendered. Empty when none is visible.
    async fn read_output(&self) -> AutomationResult<String>;

    /// Labels of the visible navigation entries, top to bottom.
    async fn conversation_labels(&self) -> AutomationResult<Vec<String>>;

    /// Clicks the navigation entry labelled `reference`.
    /// Returns `false` when no entry matched.
    async fn open_conversation(&self, reference: &str) -> AutomationResult<bool>;
}
