use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::TargetApp;
use crate::clipboard::MemoryClipboard;
use crate::error::{AutomationError, AutomationResult};

/// Call recorded by `FakeTarget`, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetEvent {
    Launch,
    Activate,
    FocusInput,
    /// Clipboard content at the moment of the paste.
    Paste(Option<String>),
    Submit,
    ReadOutput,
    ListConversations,
    OpenConversation(String),
}

/// Scripted stand-in for the target application.
///
/// Until the first submit, output reads return the surface text (empty unless
/// set with `with_surface`). After it, reads walk through the scripted samples
/// and keep returning the last one once the script runs out, like a response
/// that has stopped growing.
#[derive(Debug, Default)]
pub struct FakeTarget {
    running: AtomicBool,
    launch_starts_app: bool,
    fail_launch: bool,
    fail_activate: bool,
    fail_focus: bool,
    fail_paste: bool,
    fail_listing: bool,
    fail_open: bool,
    submitted: AtomicBool,
    outputs: Mutex<VecDeque<String>>,
    last_output: Mutex<String>,
    reads: AtomicUsize,
    labels: Vec<String>,
    clipboard: Option<Arc<MemoryClipboard>>,
    events: Mutex<Vec<TargetEvent>>,
}

impl FakeTarget {
    /// A running target with no output and no conversations.
    pub fn new() -> Self {
        Self {
            running: AtomicBool::new(true),
            launch_starts_app: true,
            ..Self::default()
        }
    }

    pub fn not_running(self) -> Self {
        self.running.store(false, Ordering::SeqCst);
        self
    }

    /// Launch calls succeed but the process never shows up.
    pub fn launch_does_nothing(mut self) -> Self {
        self.launch_starts_app = false;
        self
    }

    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    pub fn failing_activate(mut self) -> Self {
        self.fail_activate = true;
        self
    }

    pub fn failing_focus(mut self) -> Self {
        self.fail_focus = true;
        self
    }

    pub fn failing_paste(mut self) -> Self {
        self.fail_paste = true;
        self
    }

    pub fn failing_listing(mut self) -> Self {
        self.fail_listing = true;
        self
    }

    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Text already on screen before anything is submitted, such as the
    /// previous answer.
    pub fn with_surface(self, text: impl Into<String>) -> Self {
        *self.last_output.lock().unwrap_or_else(|e| e.into_inner()) = text.into();
        self
    }

    /// Starts as if a prompt had already gone out, so reads go straight to
    /// the scripted outputs.
    pub fn already_submitted(self) -> Self {
        self.submitted.store(true, Ordering::SeqCst);
        self
    }

    pub fn with_outputs<I, S>(self, outputs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.outputs.lock().unwrap_or_else(|e| e.into_inner()) =
            outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Scripts outputs by length only, using `x` characters.
    pub fn with_output_lengths(self, lengths: &[usize]) -> Self {
        self.with_outputs(lengths.iter().map(|&n| "x".repeat(n)))
    }

    pub fn with_labels<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Lets paste events capture what the clipboard held at that moment.
    pub fn observing(mut self, clipboard: Arc<MemoryClipboard>) -> Self {
        self.clipboard = Some(clipboard);
        self
    }

    pub fn events(&self) -> Vec<TargetEvent> {
        self.events.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn record(&self, event: TargetEvent) {
        self.events
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(event);
    }
}

#[async_trait]
impl TargetApp for FakeTarget {
    async fn is_running(&self) -> AutomationResult<bool> {
        Ok(self.running.load(Ordering::SeqCst))
    }

    async fn launch(&self) -> AutomationResult<()> {
        self.record(TargetEvent::Launch);
        if self.fail_launch {
            return Err(AutomationError::Script("application not found".to_string()));
        }
        if self.launch_starts_app {
            self.running.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn activate(&self) -> AutomationResult<()> {
        self.record(TargetEvent::Activate);
        if self.fail_activate {
            return Err(AutomationError::Script("cannot activate".to_string()));
        }
        Ok(())
    }

    async fn focus_input(&self) -> AutomationResult<()> {
        self.record(TargetEvent::FocusInput);
        if self.fail_focus {
            return Err(AutomationError::Script("input field not found".to_string()));
        }
        Ok(())
    }

    async fn paste(&self) -> AutomationResult<()> {
        let seen = match &self.clipboard {
            Some(clipboard) => clipboard.content(),
            None => None,
        };
        self.record(TargetEvent::Paste(seen));
        if self.fail_paste {
            return Err(AutomationError::Script("paste rejected".to_string()));
        }
        Ok(())
    }

    async fn submit(&self) -> AutomationResult<()> {
        self.record(TargetEvent::Submit);
        self.submitted.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn read_output(&self) -> AutomationResult<String> {
        self.record(TargetEvent::ReadOutput);
        self.reads.fetch_add(1, Ordering::SeqCst);
        if !self.submitted.load(Ordering::SeqCst) {
            return Ok(self.last_output.lock().unwrap_or_else(|e| e.into_inner()).clone());
        }
        let next = self
            .outputs
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        let mut last = self.last_output.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(text) = next {
            *last = text;
        }
        Ok(last.clone())
    }

    async fn conversation_labels(&self) -> AutomationResult<Vec<String>> {
        self.record(TargetEvent::ListConversations);
        if self.fail_listing {
            return Err(AutomationError::Script("window 1 does not exist".to_string()));
        }
        Ok(self.labels.clone())
    }

    async fn open_conversation(&self, reference: &str) -> AutomationResult<bool> {
        self.record(TargetEvent::OpenConversation(reference.to_string()));
        if self.fail_open {
            return Err(AutomationError::Script("sidebar not found".to_string()));
        }
        Ok(self.labels.iter().any(|label| label == reference))
    }
}
