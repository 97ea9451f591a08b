pub mod debounce;

pub use debounce::Debouncer;

use crate::clip::{Clip, ClipCollection, filter_and_sort};
use crate::storage::{
    SettingsStore, TRIM_SPACES_KEY, load_pinned_clips, read_pinned_clips, save_pinned_clips,
};
use anyhow::Result;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Read-only view of the store handed to subscribers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipSnapshot {
    pub clips: Vec<Clip>,
    pub editing_clip_id: Option<Uuid>,
    pub trim_spaces: bool,
}

impl ClipSnapshot {
    pub fn filtered_and_sorted(&self, query: &str) -> Vec<Clip> {
        filter_and_sort(&self.clips, query)
    }

    pub fn get(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    pub fn pinned_count(&self) -> usize {
        self.clips.iter().filter(|clip| clip.is_pinned).count()
    }

    pub fn recent_count(&self) -> usize {
        self.clips.len() - self.pinned_count()
    }
}

/// Sole owner of the clip collection.
///
/// Every mutation publishes a fresh [`ClipSnapshot`] and, when the collection
/// changed, schedules a debounced write of the pinned clips. The write itself
/// happens in [`ClipStore::flush_due`] or [`ClipStore::flush`], driven by
/// whoever runs the store.
pub struct ClipStore {
    clips: ClipCollection,
    editing_clip_id: Option<Uuid>,
    settings: Box<dyn SettingsStore>,
    max_recent: usize,
    save: Debouncer,
    /// Pinned clips as last read from or written to storage.
    synced_pinned: Vec<Clip>,
    updates: watch::Sender<ClipSnapshot>,
}

impl ClipStore {
    /// Builds the store from persisted pinned clips; unreadable data starts
    /// it empty.
    pub fn load(settings: Box<dyn SettingsStore>, max_recent: usize, save_debounce: Duration) -> Self {
        let clips = ClipCollection::from_clips(load_pinned_clips(settings.as_ref()));
        info!(pinned = clips.len(), "Clip store loaded");

        let (updates, _) = watch::channel(ClipSnapshot::default());
        let synced_pinned = clips.pinned();
        let store = Self {
            clips,
            editing_clip_id: None,
            settings,
            max_recent,
            save: Debouncer::new(save_debounce),
            synced_pinned,
            updates,
        };
        store.publish();
        store
    }

    pub fn subscribe(&self) -> watch::Receiver<ClipSnapshot> {
        self.updates.subscribe()
    }

    pub fn snapshot(&self) -> ClipSnapshot {
        ClipSnapshot {
            clips: self.clips.clips().to_vec(),
            editing_clip_id: self.editing_clip_id,
            trim_spaces: self.trim_spaces(),
        }
    }

    pub fn clips(&self) -> &ClipCollection {
        &self.clips
    }

    pub fn get(&self, id: Uuid) -> Option<&Clip> {
        self.clips.get(id)
    }

    pub fn pinned_count(&self) -> usize {
        self.clips.pinned_count()
    }

    pub fn recent_count(&self) -> usize {
        self.clips.recent_count()
    }

    pub fn trim_spaces(&self) -> bool {
        self.settings.get_bool(TRIM_SPACES_KEY)
    }

    pub fn set_trim_spaces(&mut self, enabled: bool) -> Result<()> {
        self.settings.set_bool(TRIM_SPACES_KEY, enabled)?;
        info!(enabled, "Trim spaces setting changed");
        self.publish();
        Ok(())
    }

    /// Records `text` as a new clip. Blank text (after the trim setting is
    /// applied) is dropped without error.
    pub fn add_clip(&mut self, text: &str, is_pinned: bool) -> Option<Uuid> {
        let text = if self.trim_spaces() { text.trim() } else { text };
        if text.trim().is_empty() {
            debug!("Ignoring blank clip");
            return None;
        }

        let clip = Clip::new(text.to_string(), is_pinned);
        let id = clip.id;
        self.clips.insert(clip);

        if !is_pinned {
            let evicted = self.clips.evict_excess(self.max_recent);
            if !evicted.is_empty() {
                debug!(count = evicted.len(), "Evicted oldest recent clips");
                if let Some(editing) = self.editing_clip_id
                    && evicted.iter().any(|clip| clip.id == editing)
                {
                    self.editing_clip_id = None;
                }
            }
        }

        debug!(id = %id, pinned = is_pinned, "Clip added");
        self.changed();
        Some(id)
    }

    pub fn toggle_pin(&mut self, id: Uuid) -> bool {
        if !self.clips.toggle_pin(id) {
            return false;
        }
        self.changed();
        true
    }

    /// Replaces a clip's text. Blank replacements are rejected so every clip
    /// keeps non-empty text.
    pub fn edit_text(&mut self, id: Uuid, new_text: &str) -> bool {
        if new_text.trim().is_empty() {
            debug!(id = %id, "Rejecting blank edit");
            return false;
        }
        if !self.clips.set_text(id, new_text.to_string()) {
            return false;
        }
        self.changed();
        true
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        if self.clips.remove(id).is_none() {
            return false;
        }
        if self.editing_clip_id == Some(id) {
            self.editing_clip_id = None;
        }
        self.changed();
        true
    }

    pub fn clear_unpinned(&mut self) -> usize {
        let removed = self.clips.clear_unpinned();
        if removed > 0 {
            if let Some(editing) = self.editing_clip_id
                && self.clips.get(editing).is_none()
            {
                self.editing_clip_id = None;
            }
            info!(removed, "Cleared recent clips");
            self.changed();
        }
        removed
    }

    pub fn filtered_and_sorted(&self, query: &str) -> Vec<Clip> {
        self.clips.filtered_and_sorted(query)
    }

    pub fn editing_clip_id(&self) -> Option<Uuid> {
        self.editing_clip_id
    }

    pub fn begin_editing(&mut self, id: Uuid) -> bool {
        if self.clips.get(id).is_none() {
            return false;
        }
        self.editing_clip_id = Some(id);
        self.publish();
        true
    }

    pub fn end_editing(&mut self) {
        if self.editing_clip_id.take().is_some() {
            self.publish();
        }
    }

    pub fn most_recent_unpinned_text(&self) -> Option<&str> {
        self.clips.most_recent_unpinned().map(|clip| clip.text.as_str())
    }

    pub fn save_deadline(&self) -> Option<Instant> {
        self.save.deadline()
    }

    pub fn has_pending_save(&self) -> bool {
        self.save.is_pending()
    }

    /// Writes the pinned clips if the debounce deadline has passed.
    pub fn flush_due(&mut self, now: Instant) -> bool {
        if self.save.fire_if_due(now) {
            self.write_pinned();
            true
        } else {
            false
        }
    }

    /// Writes immediately if a save is pending.
    pub fn flush(&mut self) -> bool {
        if self.save.take() {
            self.write_pinned();
            true
        } else {
            false
        }
    }

    /// Picks up pinned clips written by another process (a one-shot CLI
    /// command, say) and publishes the result. Returns `true` if the
    /// collection changed.
    pub fn reload_external(&mut self) -> bool {
        if !self.merge_external() {
            return false;
        }
        self.publish();
        true
    }

    fn merge_external(&mut self) -> bool {
        let external = match read_pinned_clips(self.settings.as_ref()) {
            Ok(Some(external)) => external,
            Ok(None) => return false,
            Err(e) => {
                warn!(error = %e, "Could not read stored pinned clips");
                return false;
            }
        };
        if external == self.synced_pinned {
            return false;
        }

        let changed = self.clips.merge_pinned(&self.synced_pinned, &external);
        self.synced_pinned = external;
        if let Some(editing) = self.editing_clip_id
            && self.clips.get(editing).is_none()
        {
            self.editing_clip_id = None;
        }
        if changed {
            info!(pinned = self.clips.pinned_count(), "Merged pinned clips changed elsewhere");
        }
        changed
    }

    fn changed(&mut self) {
        self.publish();
        self.save.schedule();
    }

    fn publish(&self) {
        self.updates.send_replace(self.snapshot());
    }

    /// Folds in changes made by other writers first, so a save never
    /// drops their clips.
    fn write_pinned(&mut self) {
        if self.merge_external() {
            self.publish();
        }
        match save_pinned_clips(self.settings.as_ref(), self.clips.clips()) {
            Ok(()) => {
                self.synced_pinned = self.clips.pinned();
                debug!(pinned = self.synced_pinned.len(), "Saved pinned clips");
            }
            Err(e) => warn!(error = %e, "Failed to save pinned clips"),
        }
    }
}
