use super::ClipboardHost;
use anyhow::{Context, Result};
use arboard::Clipboard;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use tracing::debug;

/// The desktop clipboard through arboard.
///
/// arboard has no native change counter, so one is derived: every
/// `change_count` call fingerprints the current text and bumps the counter
/// when the fingerprint moved. On Linux the clipboard contents we set persist
/// only while this value is alive.
pub struct SystemClipboard {
    clipboard: Clipboard,
    counter: u64,
    fingerprint: Option<u64>,
}

impl SystemClipboard {
    pub fn new() -> Result<Self> {
        let mut clipboard = Clipboard::new().context("Failed to access system clipboard")?;
        let fingerprint = fingerprint(clipboard.get_text().ok().as_deref());
        Ok(Self {
            clipboard,
            counter: 0,
            fingerprint,
        })
    }
}

fn fingerprint(text: Option<&str>) -> Option<u64> {
    text.map(|t| {
        let mut hasher = DefaultHasher::new();
        t.hash(&mut hasher);
        hasher.finish()
    })
}

impl ClipboardHost for SystemClipboard {
    fn change_count(&mut self) -> u64 {
        let current = fingerprint(self.clipboard.get_text().ok().as_deref());
        if current != self.fingerprint {
            self.fingerprint = current;
            self.counter += 1;
            debug!(counter = self.counter, "Clipboard contents changed");
        }
        self.counter
    }

    fn read_text(&mut self) -> Option<String> {
        self.clipboard.get_text().ok()
    }

    fn write_text(&mut self, text: &str) -> Result<()> {
        self.clipboard
            .set_text(text)
            .context("Failed to copy text to clipboard")?;
        self.fingerprint = fingerprint(Some(text));
        self.counter += 1;
        Ok(())
    }
}
