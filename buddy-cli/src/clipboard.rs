use arboard::Clipboard;
use brainstorm_buddy::session::{ClipboardError, ClipboardWriter};

/// Arboard-based system clipboard.
pub struct ArboardClipboard {
    clipboard: Clipboard,
}

impl ArboardClipboard {
    pub fn new() -> Result<Self, ClipboardError> {
        let clipboard = Clipboard::new().map_err(|err| ClipboardError::new(err.to_string()))?;
        Ok(Self { clipboard })
    }
}

impl ClipboardWriter for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), ClipboardError> {
        self.clipboard
            .set_text(text)
            .map_err(|err| ClipboardError::new(err.to_string()))
    }
}
