use anyhow::Result;

/// Destination for copied feed links.
pub trait ClipboardPort: Send + Sync {
    fn set_text(&self, text: &str) -> Result<()>;
}

/// The system clipboard.
///
/// A fresh handle is opened per copy; holding one open for the life of the
/// TUI keeps an X11 connection around for nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

impl ClipboardPort for SystemClipboard {
    fn set_text(&self, text: &str) -> Result<()> {
        arboard::Clipboard::new()
            .and_then(|mut clipboard| clipboard.set_text(text))
            .map_err(|e| anyhow::anyhow!("clipboard unavailable: {e}"))
    }
}
