//! Clipboard port.

use thiserror::Error;

/// Failure reported by a clipboard backend.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("clipboard unavailable: {reason}")]
pub struct ClipboardError {
    reason: String,
}

impl ClipboardError {
    /// Wraps a backend error message.
    #[must_use]
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Port for writing to a clipboard.
pub trait ClipboardWriter {
    /// Write text to the clipboard.
    ///
    /// # Errors
    ///
    /// Returns a [`ClipboardError`] if the backend rejects the write.
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError>;
}

/// In-process clipboard that keeps the last written text.
///
/// Used where no system clipboard exists (headless terminals, tests).
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    contents: Option<String>,
}

impl MemoryClipboard {
    /// Creates an empty clipboard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last written text.
    #[must_use]
    pub fn contents(&self) -> Option<&str> {
        self.contents.as_deref()
    }
}

impl ClipboardWriter for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.contents = Some(text.to_owned());
        Ok(())
    }
}
