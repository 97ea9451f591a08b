use super::mode::Mode;
use crate::clip::Clip;
use crate::service::{ClipHandle, Notice};
use crate::store::ClipSnapshot;
use crate::ui::theme::Theme;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::sync::watch;
use uuid::Uuid;

const STATUS_MESSAGE_TTL: Duration = Duration::from_secs(2);

pub struct AppState {
    pub clips: ClipHandle,
    updates: watch::Receiver<ClipSnapshot>,
    notices: broadcast::Receiver<Notice>,
    pub snapshot: ClipSnapshot,
    /// Clips matching the search query, in display order.
    pub visible: Vec<Clip>,
    pub cursor_position: usize,
    pub mode: Mode,
    pub search_query: String,
    pub edit_buffer: String,
    pub edit_cursor_pos: usize,
    pub is_adding_clip: bool,
    /// The clip the edit buffer was opened on. Tracked here because the
    /// snapshot may lag behind `begin_editing`.
    pub editing_id: Option<Uuid>,
    pub should_quit: bool,
    pub show_help: bool,
    pub theme: Theme,
    pub status_message: Option<(String, Instant)>,
}

impl AppState {
    pub fn new(clips: ClipHandle, theme: Theme) -> Self {
        let mut updates = clips.subscribe();
        let snapshot = updates.borrow_and_update().clone();
        let notices = clips.notices();
        let mut state = Self {
            clips,
            updates,
            notices,
            snapshot,
            visible: Vec::new(),
            cursor_position: 0,
            mode: Mode::Navigate,
            search_query: String::new(),
            edit_buffer: String::new(),
            edit_cursor_pos: 0,
            is_adding_clip: false,
            editing_id: None,
            should_quit: false,
            show_help: false,
            theme,
            status_message: None,
        };
        state.apply_filter();
        state
    }

    /// Pulls the latest snapshot and notices from the service, keeping the
    /// cursor on the same clip when it is still visible. Returns `true` if
    /// anything changed.
    pub fn refresh(&mut self) -> bool {
        let noticed = self.drain_notices();
        if !self.updates.has_changed().unwrap_or(false) {
            return noticed;
        }
        self.snapshot = self.updates.borrow_and_update().clone();
        self.apply_filter();
        self.drop_vanished_edit();
        true
    }

    fn drain_notices(&mut self) -> bool {
        let mut seen = false;
        loop {
            let message = match self.notices.try_recv() {
                Ok(Notice::Copied) => "Copied to clipboard".to_string(),
                Ok(Notice::CopyFailed(reason)) => format!("Copy failed: {reason}"),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return seen,
            };
            self.set_status_message(message);
            seen = true;
        }
    }

    /// Leaves edit mode when the clip being edited was evicted or removed.
    fn drop_vanished_edit(&mut self) {
        if self.mode != Mode::Edit || self.is_adding_clip {
            return;
        }
        match self.editing_id {
            Some(id) if self.has_clip(id) => {}
            _ => {
                self.reset_edit_buffer();
                self.mode = Mode::Navigate;
                self.set_status_message("Clip no longer exists");
            }
        }
    }

    pub fn has_clip(&self, id: Uuid) -> bool {
        self.snapshot.clips.iter().any(|clip| clip.id == id)
    }

    pub fn apply_filter(&mut self) {
        let selected = self.selected_id();
        self.visible = self.snapshot.filtered_and_sorted(&self.search_query);

        if let Some(id) = selected
            && let Some(idx) = self.visible.iter().position(|clip| clip.id == id)
        {
            self.cursor_position = idx;
        }
        self.clamp_cursor();
    }

    pub fn move_cursor_up(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn move_cursor_down(&mut self) {
        if !self.visible.is_empty() && self.cursor_position < self.visible.len() - 1 {
            self.cursor_position += 1;
        }
    }

    pub fn clamp_cursor(&mut self) {
        if !self.visible.is_empty() {
            self.cursor_position = self.cursor_position.min(self.visible.len() - 1);
        } else {
            self.cursor_position = 0;
        }
    }

    pub fn selected_clip(&self) -> Option<&Clip> {
        self.visible.get(self.cursor_position)
    }

    pub fn selected_id(&self) -> Option<Uuid> {
        self.selected_clip().map(|clip| clip.id)
    }

    pub fn pinned_visible(&self) -> usize {
        self.visible.iter().filter(|clip| clip.is_pinned).count()
    }

    pub fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = Some((message.into(), Instant::now()));
    }

    pub fn clear_expired_status_message(&mut self) {
        if let Some((_, shown_at)) = &self.status_message
            && shown_at.elapsed() >= STATUS_MESSAGE_TTL
        {
            self.status_message = None;
        }
    }

    pub fn status_text(&self) -> Option<&str> {
        self.status_message.as_ref().map(|(msg, _)| msg.as_str())
    }

    pub fn reset_edit_buffer(&mut self) {
        self.edit_buffer.clear();
        self.edit_cursor_pos = 0;
        self.is_adding_clip = false;
        self.editing_id = None;
    }
}
