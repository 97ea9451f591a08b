use super::Clip;
use std::cmp::{Ordering, Reverse};
use std::collections::HashSet;
use uuid::Uuid;

pub const DEFAULT_MAX_RECENT_CLIPS: usize = 50;

/// Ordered clip storage. Storage order carries no meaning on its own; display
/// order always comes from [`ClipCollection::filtered_and_sorted`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipCollection {
    clips: Vec<Clip>,
}

impl ClipCollection {
    pub fn new() -> Self {
        Self { clips: Vec::new() }
    }

    /// Builds a collection from loaded clips, dropping entries with duplicate
    /// ids or blank text.
    pub fn from_clips(clips: Vec<Clip>) -> Self {
        let mut seen = HashSet::new();
        let clips = clips
            .into_iter()
            .filter(|clip| !clip.text.trim().is_empty())
            .filter(|clip| seen.insert(clip.id))
            .collect();
        Self { clips }
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Clip> {
        self.clips.iter().find(|clip| clip.id == id)
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.clips.iter().position(|clip| clip.id == id)
    }

    /// Pinned clips go to the head; unpinned clips go right after the last
    /// pinned clip.
    pub fn insert(&mut self, clip: Clip) {
        if clip.is_pinned {
            self.clips.insert(0, clip);
        } else {
            let index = self
                .clips
                .iter()
                .rposition(|c| c.is_pinned)
                .map(|i| i + 1)
                .unwrap_or(0);
            self.clips.insert(index, clip);
        }
    }

    /// Removes the oldest unpinned clips until at most `max_recent` remain.
    /// Ties on `date_added` go to the clip stored further back, which was
    /// inserted earlier.
    pub fn evict_excess(&mut self, max_recent: usize) -> Vec<Clip> {
        let mut unpinned: Vec<(usize, &Clip)> = self
            .clips
            .iter()
            .enumerate()
            .filter(|(_, clip)| !clip.is_pinned)
            .collect();

        if unpinned.len() <= max_recent {
            return Vec::new();
        }

        let excess = unpinned.len() - max_recent;
        unpinned.sort_by_key(|(idx, clip)| (clip.date_added, Reverse(*idx)));
        let doomed: HashSet<Uuid> = unpinned
            .iter()
            .take(excess)
            .map(|(_, clip)| clip.id)
            .collect();

        let (evicted, kept): (Vec<Clip>, Vec<Clip>) = self
            .clips
            .drain(..)
            .partition(|clip| doomed.contains(&clip.id));
        self.clips = kept;
        evicted
    }

    pub fn toggle_pin(&mut self, id: Uuid) -> bool {
        match self.clips.iter_mut().find(|clip| clip.id == id) {
            Some(clip) => {
                clip.toggle_pin();
                true
            }
            None => false,
        }
    }

    pub fn set_text(&mut self, id: Uuid, text: String) -> bool {
        match self.clips.iter_mut().find(|clip| clip.id == id) {
            Some(clip) => {
                clip.text = text;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: Uuid) -> Option<Clip> {
        self.position(id).map(|idx| self.clips.remove(idx))
    }

    pub fn clear_unpinned(&mut self) -> usize {
        let before = self.clips.len();
        self.clips.retain(|clip| clip.is_pinned);
        before - self.clips.len()
    }

    /// Applies changes another writer made to the persisted pinned clips.
    ///
    /// `base` is the pinned list as last read or written by this collection,
    /// `external` is what storage holds now. Clips added there are inserted,
    /// clips dropped there are removed (unless unpinned here meanwhile), and
    /// text edited there replaces local text. Local changes to anything the
    /// other writer left alone are kept. Returns `true` if anything changed.
    pub fn merge_pinned(&mut self, base: &[Clip], external: &[Clip]) -> bool {
        let mut changed = false;

        for old in base {
            if external.iter().any(|clip| clip.id == old.id) {
                continue;
            }
            if self.get(old.id).is_some_and(|clip| clip.is_pinned) {
                self.remove(old.id);
                changed = true;
            }
        }

        for clip in external {
            if clip.text.trim().is_empty() {
                continue;
            }
            match base.iter().find(|old| old.id == clip.id) {
                None if self.get(clip.id).is_none() => {
                    let mut clip = clip.clone();
                    clip.is_pinned = true;
                    self.insert(clip);
                    changed = true;
                }
                Some(old) if old.text != clip.text => {
                    changed |= self.set_text(clip.id, clip.text.clone());
                }
                _ => {}
            }
        }

        changed
    }

    pub fn pinned(&self) -> Vec<Clip> {
        self.clips.iter().filter(|clip| clip.is_pinned).cloned().collect()
    }

    pub fn pinned_count(&self) -> usize {
        self.clips.iter().filter(|clip| clip.is_pinned).count()
    }

    pub fn recent_count(&self) -> usize {
        self.clips.len() - self.pinned_count()
    }

    pub fn most_recent_unpinned(&self) -> Option<&Clip> {
        self.clips
            .iter()
            .enumerate()
            .filter(|(_, clip)| !clip.is_pinned)
            .max_by(|(ia, a), (ib, b)| a.date_added.cmp(&b.date_added).then(ib.cmp(ia)))
            .map(|(_, clip)| clip)
    }

    pub fn filtered_and_sorted(&self, query: &str) -> Vec<Clip> {
        filter_and_sort(&self.clips, query)
    }
}

/// Case-insensitive substring filter, then pinned first and newest first.
pub fn filter_and_sort(clips: &[Clip], query: &str) -> Vec<Clip> {
    let needle = query.trim().to_lowercase();
    let mut matching: Vec<Clip> = clips
        .iter()
        .filter(|clip| clip.matches(&needle))
        .cloned()
        .collect();
    matching.sort_by(display_order);
    matching
}

fn display_order(a: &Clip, b: &Clip) -> Ordering {
    b.is_pinned
        .cmp(&a.is_pinned)
        .then_with(|| b.date_added.cmp(&a.date_added))
}
