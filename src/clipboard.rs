use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use arboard::{Clipboard, ImageData};
use tracing::{debug, warn};

use crate::error::{AutomationError, AutomationResult};

/// What the side channel held at one moment.
///
/// Non-text content is kept as well, so that borrowing the channel for a
/// prompt never throws away a copied image or file selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Snapshot {
    Empty,
    Text(String),
    Files(Vec<PathBuf>),
    Image {
        width: usize,
        height: usize,
        bytes: Vec<u8>,
    },
}

impl Snapshot {
    pub fn text(&self) -> Option<&str> {
        match self {
            Snapshot::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }
}

/// Shared bulk-transfer medium between this process and the target.
pub trait SideChannel: Send + Sync {
    fn read(&self) -> AutomationResult<Snapshot>;
    fn write(&self, text: &str) -> AutomationResult<()>;
    /// Puts a previously read snapshot back. `Snapshot::Empty` clears the channel.
    fn restore(&self, snapshot: &Snapshot) -> AutomationResult<()>;
}

impl<C: SideChannel + ?Sized> SideChannel for Arc<C> {
    fn read(&self) -> AutomationResult<Snapshot> {
        (**self).read()
    }

    fn write(&self, text: &str) -> AutomationResult<()> {
        (**self).write(text)
    }

    fn restore(&self, snapshot: &Snapshot) -> AutomationResult<()> {
        (**self).restore(snapshot)
    }
}

/// The operating system clipboard.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

fn open() -> AutomationResult<Clipboard> {
    Clipboard::new().map_err(clipboard_error)
}

fn clipboard_error(e: arboard::Error) -> AutomationError {
    AutomationError::Clipboard(e.to_string())
}

impl SideChannel for SystemClipboard {
    /// Probes file lists first, since a Finder copy also offers the file
    /// name as plain text. Anything arboard cannot read reports as empty.
    fn read(&self) -> AutomationResult<Snapshot> {
        let mut clipboard = open()?;

        if let Ok(files) = clipboard.get().file_list()
            && !files.is_empty()
        {
            return Ok(Snapshot::Files(files));
        }

        match clipboard.get_text() {
            Ok(text) => return Ok(Snapshot::Text(text)),
            Err(arboard::Error::ContentNotAvailable) => {}
            Err(e) => return Err(clipboard_error(e)),
        }

        match clipboard.get_image() {
            Ok(image) => Ok(Snapshot::Image {
                width: image.width,
                height: image.height,
                bytes: image.bytes.into_owned(),
            }),
            Err(arboard::Error::ContentNotAvailable) => {
                debug!("clipboard holds nothing readable");
                Ok(Snapshot::Empty)
            }
            Err(e) => Err(clipboard_error(e)),
        }
    }

    fn write(&self, text: &str) -> AutomationResult<()> {
        open()?.set_text(text).map_err(clipboard_error)
    }

    fn restore(&self, snapshot: &Snapshot) -> AutomationResult<()> {
        let mut clipboard = open()?;
        let restored = match snapshot {
            Snapshot::Empty => clipboard.clear(),
            Snapshot::Text(text) => clipboard.set_text(text.as_str()),
            Snapshot::Files(files) => clipboard.set().file_list(files.as_slice()),
            Snapshot::Image {
                width,
                height,
                bytes,
            } => clipboard.set_image(ImageData {
                width: *width,
                height: *height,
                bytes: bytes.as_slice().into(),
            }),
        };
        restored.map_err(clipboard_error)
    }
}

/// Operation recorded by `MemoryClipboard`, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardOp {
    Read,
    Write(String),
    Restore(Snapshot),
}

/// In-process clipboard used by tests and dry runs.
#[derive(Debug)]
pub struct MemoryClipboard {
    content: Mutex<Snapshot>,
    ops: Mutex<Vec<ClipboardOp>>,
}

impl Default for MemoryClipboard {
    fn default() -> Self {
        Self::with_snapshot(Snapshot::Empty)
    }
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content(text: impl Into<String>) -> Self {
        Self::with_snapshot(Snapshot::Text(text.into()))
    }

    pub fn with_snapshot(snapshot: Snapshot) -> Self {
        Self {
            content: Mutex::new(snapshot),
            ops: Mutex::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        self.content
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Current text content, if the clipboard holds text.
    pub fn content(&self) -> Option<String> {
        self.snapshot().text().map(str::to_string)
    }

    pub fn ops(&self) -> Vec<ClipboardOp> {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn record(&self, op: ClipboardOp) {
        self.ops.lock().unwrap_or_else(|e| e.into_inner()).push(op);
    }

    fn set(&self, value: Snapshot) {
        *self.content.lock().unwrap_or_else(|e| e.into_inner()) = value;
    }
}

impl SideChannel for MemoryClipboard {
    fn read(&self) -> AutomationResult<Snapshot> {
        self.record(ClipboardOp::Read);
        Ok(self.snapshot())
    }

    fn write(&self, text: &str) -> AutomationResult<()> {
        self.record(ClipboardOp::Write(text.to_string()));
        self.set(Snapshot::Text(text.to_string()));
        Ok(())
    }

    fn restore(&self, snapshot: &Snapshot) -> AutomationResult<()> {
        self.record(ClipboardOp::Restore(snapshot.clone()));
        self.set(snapshot.clone());
        Ok(())
    }
}

/// Holds a snapshot of the side channel and puts it back when released.
///
/// Restoration runs on drop as well, so an early `?` return between
/// `take` and `restore` still leaves the user's clipboard intact.
pub struct ClipboardGuard<'a, C: SideChannel + ?Sized> {
    channel: &'a C,
    snapshot: Snapshot,
    restored: bool,
}

impl<'a, C: SideChannel + ?Sized> ClipboardGuard<'a, C> {
    pub fn take(channel: &'a C) -> AutomationResult<Self> {
        let snapshot = channel.read()?;
        Ok(Self {
            channel,
            snapshot,
            restored: false,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Restores the snapshot now and reports whether that worked.
    pub fn restore(mut self) -> AutomationResult<()> {
        self.restored = true;
        self.channel.restore(&self.snapshot)
    }
}

impl<C: SideChannel + ?Sized> Drop for ClipboardGuard<'_, C> {
    fn drop(&mut self) {
        if self.restored {
            return;
        }
        if let Err(e) = self.channel.restore(&self.snapshot) {
            warn!(error = %e, "failed to restore clipboard");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_clipboard_starts_empty() {
        let clipboard = MemoryClipboard::new();
        assert_eq!(clipboard.read().unwrap(), Snapshot::Empty);
    }

    #[test]
    fn guard_restores_previous_text() {
        let clipboard = MemoryClipboard::with_content("user copied this");

        let guard = ClipboardGuard::take(&clipboard).unwrap();
        assert_eq!(guard.snapshot().text(), Some("user copied this"));
        clipboard.write("prompt").unwrap();
        guard.restore().unwrap();

        assert_eq!(clipboard.content().as_deref(), Some("user copied this"));
    }

    #[test]
    fn guard_clears_when_nothing_was_copied() {
        let clipboard = MemoryClipboard::new();

        let guard = ClipboardGuard::take(&clipboard).unwrap();
        clipboard.write("prompt").unwrap();
        guard.restore().unwrap();

        assert_eq!(clipboard.snapshot(), Snapshot::Empty);
        assert_eq!(
            clipboard.ops().last(),
            Some(&ClipboardOp::Restore(Snapshot::Empty))
        );
    }

    #[test]
    fn guard_puts_back_a_copied_image() {
        let image = Snapshot::Image {
            width: 2,
            height: 1,
            bytes: vec![255, 0, 0, 255, 0, 255, 0, 255],
        };
        let clipboard = MemoryClipboard::with_snapshot(image.clone());

        let guard = ClipboardGuard::take(&clipboard).unwrap();
        clipboard.write("prompt").unwrap();
        guard.restore().unwrap();

        assert_eq!(clipboard.snapshot(), image);
        assert_eq!(clipboard.content(), None);
    }

    #[test]
    fn guard_puts_back_copied_files_on_drop() {
        let files = Snapshot::Files(vec![PathBuf::from("/tmp/report.pdf")]);
        let clipboard = MemoryClipboard::with_snapshot(files.clone());

        {
            let _guard = ClipboardGuard::take(&clipboard).unwrap();
            clipboard.write("transient").unwrap();
        }

        assert_eq!(clipboard.snapshot(), files);
    }

    #[test]
    fn guard_restores_on_drop() {
        let clipboard = MemoryClipboard::with_content("keep me");

        {
            let _guard = ClipboardGuard::take(&clipboard).unwrap();
            clipboard.write("transient").unwrap();
        }

        assert_eq!(clipboard.content().as_deref(), Some("keep me"));
    }

    #[test]
    fn explicit_restore_is_not_repeated_on_drop() {
        let clipboard = MemoryClipboard::with_content("original");

        let guard = ClipboardGuard::take(&clipboard).unwrap();
        clipboard.write("prompt").unwrap();
        guard.restore().unwrap();

        assert_eq!(
            clipboard.ops(),
            vec![
                ClipboardOp::Read,
                ClipboardOp::Write("prompt".to_string()),
                ClipboardOp::Restore(Snapshot::Text("original".to_string())),
            ]
        );
    }
}
