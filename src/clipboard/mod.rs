pub mod system;

pub use system::SystemClipboard;

use anyhow::Result;

/// What the watcher needs from the host clipboard.
///
/// `change_count` must increase on every write to the clipboard, whoever made
/// it, so a poll can detect changes without comparing content.
pub trait ClipboardHost {
    fn change_count(&mut self) -> u64;
    fn read_text(&mut self) -> Option<String>;
    fn write_text(&mut self, text: &str) -> Result<()>;
}
