use super::mode::Mode;
use super::state::AppState;
use crate::utils::unicode::{next_char_boundary, prev_char_boundary};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

pub fn handle_key_event(key: KeyEvent, state: &mut AppState) {
    if state.show_help {
        state.show_help = false;
        return;
    }

    match state.mode {
        Mode::Navigate => handle_navigate_mode(key, state),
        Mode::Search => handle_search_mode(key, state),
        Mode::Edit => handle_edit_mode(key, state),
    }
}

fn handle_navigate_mode(key: KeyEvent, state: &mut AppState) {
    match (key.code, key.modifiers) {
        (KeyCode::Up, _) | (KeyCode::Char('k'), KeyModifiers::NONE) => {
            state.move_cursor_up();
        }
        (KeyCode::Down, _) | (KeyCode::Char('j'), KeyModifiers::NONE) => {
            state.move_cursor_down();
        }

        // Copy back to the clipboard
        (KeyCode::Enter, _) | (KeyCode::Char('c'), KeyModifiers::NONE) => {
            if let Some(id) = state.selected_id() {
                state.clips.copy_to_clipboard(id);
            }
        }

        (KeyCode::Char('p'), KeyModifiers::NONE) => {
            if let Some(clip) = state.selected_clip() {
                let message = if clip.is_pinned { "Unpinned" } else { "Pinned" };
                state.clips.toggle_pin(clip.id);
                state.set_status_message(message);
            }
        }

        (KeyCode::Char('e'), KeyModifiers::NONE) | (KeyCode::Char('i'), KeyModifiers::NONE) => {
            enter_edit_mode(state);
        }

        (KeyCode::Char('n'), KeyModifiers::NONE) => {
            state.reset_edit_buffer();
            state.is_adding_clip = true;
            state.mode = Mode::Edit;
        }

        (KeyCode::Char('d'), KeyModifiers::NONE) => {
            if let Some(id) = state.selected_id() {
                state.clips.delete(id);
                state.set_status_message("Deleted");
            }
        }

        (KeyCode::Char('X'), _) => {
            if state.snapshot.recent_count() > 0 {
                state.clips.clear_unpinned();
                state.set_status_message("Cleared recent clips");
            }
        }

        (KeyCode::Char('/'), KeyModifiers::NONE) => {
            state.mode = Mode::Search;
        }
        (KeyCode::Esc, _) => {
            if !state.search_query.is_empty() {
                state.search_query.clear();
                state.apply_filter();
            }
        }

        (KeyCode::Char('t'), KeyModifiers::NONE) => {
            let enabled = !state.snapshot.trim_spaces;
            state.clips.set_trim_spaces(enabled);
            state.set_status_message(if enabled {
                "Trimming spaces on new clips"
            } else {
                "Keeping spaces on new clips"
            });
        }

        (KeyCode::Char('?'), KeyModifiers::NONE) => {
            state.show_help = true;
        }

        (KeyCode::Char('q'), KeyModifiers::NONE) => {
            state.should_quit = true;
        }
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            state.should_quit = true;
        }

        _ => {}
    }
}

fn handle_search_mode(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => {
            state.search_query.clear();
            state.apply_filter();
            state.mode = Mode::Navigate;
        }
        KeyCode::Enter | KeyCode::Down | KeyCode::Up => {
            state.mode = Mode::Navigate;
        }
        KeyCode::Backspace => {
            state.search_query.pop();
            state.apply_filter();
        }
        KeyCode::Char(c) => {
            state.search_query.push(c);
            state.apply_filter();
        }
        _ => {}
    }
}

fn handle_edit_mode(key: KeyEvent, state: &mut AppState) {
    match key.code {
        KeyCode::Esc => {
            if !state.is_adding_clip {
                state.clips.end_editing();
            }
            state.reset_edit_buffer();
            state.mode = Mode::Navigate;
        }
        KeyCode::Enter => {
            save_edit_buffer(state);
            state.mode = Mode::Navigate;
        }
        KeyCode::Backspace => {
            if state.edit_cursor_pos > 0 {
                let start = prev_char_boundary(&state.edit_buffer, state.edit_cursor_pos);
                state.edit_buffer.replace_range(start..state.edit_cursor_pos, "");
                state.edit_cursor_pos = start;
            }
        }
        KeyCode::Delete => {
            if state.edit_cursor_pos < state.edit_buffer.len() {
                let end = next_char_boundary(&state.edit_buffer, state.edit_cursor_pos);
                state.edit_buffer.replace_range(state.edit_cursor_pos..end, "");
            }
        }
        KeyCode::Left => {
            state.edit_cursor_pos = prev_char_boundary(&state.edit_buffer, state.edit_cursor_pos);
        }
        KeyCode::Right => {
            state.edit_cursor_pos = next_char_boundary(&state.edit_buffer, state.edit_cursor_pos);
        }
        KeyCode::Home => {
            state.edit_cursor_pos = 0;
        }
        KeyCode::End => {
            state.edit_cursor_pos = state.edit_buffer.len();
        }
        KeyCode::Char(c) => {
            state.edit_buffer.insert(state.edit_cursor_pos, c);
            state.edit_cursor_pos += c.len_utf8();
        }
        _ => {}
    }
}

fn enter_edit_mode(state: &mut AppState) {
    if let Some(clip) = state.selected_clip() {
        let (id, text) = (clip.id, clip.text.clone());
        state.clips.begin_editing(id);
        state.edit_buffer = text;
        state.edit_cursor_pos = state.edit_buffer.len();
        state.is_adding_clip = false;
        state.editing_id = Some(id);
        state.mode = Mode::Edit;
    }
}

fn save_edit_buffer(state: &mut AppState) {
    if state.edit_buffer.trim().is_empty() {
        if !state.is_adding_clip {
            state.clips.end_editing();
            state.set_status_message("Empty text discarded");
        }
        state.reset_edit_buffer();
        return;
    }

    let text = std::mem::take(&mut state.edit_buffer);
    if state.is_adding_clip {
        state.clips.add_clip(text, false);
    } else if let Some(id) = state.editing_id.filter(|id| state.has_clip(*id)) {
        // Stale if the clip went away since the last refresh; the service
        // ignores edits to missing ids.
        state.clips.edit_text(id, text);
        state.clips.end_editing();
    } else {
        state.clips.end_editing();
        state.set_status_message("Clip no longer exists");
    }
    state.reset_edit_buffer();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{running_state, settle};
    use pretty_assertions::assert_eq;

    fn press(state: &mut AppState, code: KeyCode) {
        handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), state);
    }

    fn type_text(state: &mut AppState, text: &str) {
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_add_clip_through_edit_mode() {
        let (mut state, _) = running_state();

        press(&mut state, KeyCode::Char('n'));
        assert_eq!(state.mode, Mode::Edit);
        type_text(&mut state, "typed by hand");
        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(state.mode, Mode::Navigate);
        assert_eq!(state.visible.len(), 1);
        assert_eq!(state.visible[0].text, "typed by hand");
        assert!(!state.visible[0].is_pinned);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_selected_clip() {
        let (mut state, _) = running_state();
        state.clips.add_clip("tpyo", false);
        settle(&mut state).await;

        press(&mut state, KeyCode::Char('e'));
        settle(&mut state).await;
        assert_eq!(state.snapshot.editing_clip_id, state.selected_id());

        press(&mut state, KeyCode::Home);
        press(&mut state, KeyCode::Delete);
        press(&mut state, KeyCode::Delete);
        type_text(&mut state, "ty");
        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(state.visible[0].text, "tyyo");
        assert_eq!(state.snapshot.editing_clip_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_handles_multibyte_text() {
        let (mut state, _) = running_state();
        press(&mut state, KeyCode::Char('n'));
        type_text(&mut state, "añb");
        press(&mut state, KeyCode::Left);
        press(&mut state, KeyCode::Backspace);

        assert_eq!(state.edit_buffer, "ab");
        assert_eq!(state.edit_cursor_pos, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_edit_keeps_original() {
        let (mut state, _) = running_state();
        state.clips.add_clip("original", false);
        settle(&mut state).await;

        press(&mut state, KeyCode::Char('e'));
        press(&mut state, KeyCode::End);
        for _ in 0.."original".len() {
            press(&mut state, KeyCode::Backspace);
        }
        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(state.visible[0].text, "original");
        assert_eq!(state.status_text(), Some("Empty text discarded"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pin_delete_and_clear() {
        let (mut state, _) = running_state();
        state.clips.add_clip("keep", false);
        state.clips.add_clip("drop", false);
        state.clips.add_clip("gone", false);
        settle(&mut state).await;

        // newest first: gone, drop, keep
        press(&mut state, KeyCode::Char('d'));
        settle(&mut state).await;
        assert_eq!(state.visible.len(), 2);

        state.cursor_position = 1;
        press(&mut state, KeyCode::Char('p'));
        settle(&mut state).await;
        assert!(state.visible[0].is_pinned);
        assert_eq!(state.visible[0].text, "keep");

        handle_key_event(
            KeyEvent::new(KeyCode::Char('X'), KeyModifiers::SHIFT),
            &mut state,
        );
        settle(&mut state).await;
        assert_eq!(state.visible.len(), 1);
        assert_eq!(state.visible[0].text, "keep");
    }

    #[tokio::test(start_paused = true)]
    async fn test_copy_writes_clipboard() {
        let (mut state, clipboard) = running_state();
        state.clips.add_clip("to the clipboard", false);
        settle(&mut state).await;

        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(clipboard.contents().as_deref(), Some("to the clipboard"));
        assert_eq!(state.status_text(), Some("Copied to clipboard"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_copy_is_reported() {
        let (mut state, clipboard) = running_state();
        state.clips.add_clip("unreachable", false);
        settle(&mut state).await;

        clipboard.fail_writes(true);
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.status_text(), None);
        settle(&mut state).await;

        assert_eq!(clipboard.contents(), None);
        assert_eq!(state.status_text(), Some("Copy failed: clipboard is locked"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_evicted_edit_target_leaves_edit_mode() {
        let (mut state, _) = running_state();
        state.clips.add_clip("victim", false);
        settle(&mut state).await;
        press(&mut state, KeyCode::Char('e'));
        assert_eq!(state.mode, Mode::Edit);

        for i in 0..50 {
            state.clips.add_clip(format!("filler {i}"), false);
        }
        settle(&mut state).await;

        assert_eq!(state.mode, Mode::Navigate);
        assert_eq!(state.status_text(), Some("Clip no longer exists"));
        assert!(state.edit_buffer.is_empty());
        assert_eq!(state.editing_id, None);
        assert_eq!(state.visible.len(), 50);
        assert!(state.visible.iter().all(|clip| clip.text.starts_with("filler ")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_saving_after_target_cleared_changes_nothing() {
        let (mut state, _) = running_state();
        state.clips.add_clip("keeper", true);
        state.clips.add_clip("victim", false);
        settle(&mut state).await;

        state.cursor_position = 1;
        press(&mut state, KeyCode::Char('e'));
        state.clips.clear_unpinned();
        // The snapshot still lists the victim.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        type_text(&mut state, " edited");
        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(state.mode, Mode::Navigate);
        assert_eq!(state.visible.len(), 1);
        assert_eq!(state.visible[0].text, "keeper");
        assert_eq!(state.snapshot.editing_clip_id, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_without_known_target_is_discarded() {
        let (mut state, _) = running_state();
        state.clips.add_clip("bystander", false);
        settle(&mut state).await;

        state.mode = Mode::Edit;
        state.edit_buffer = "orphaned text".to_string();
        press(&mut state, KeyCode::Enter);
        settle(&mut state).await;

        assert_eq!(state.visible[0].text, "bystander");
        assert_eq!(state.status_text(), Some("Clip no longer exists"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_mode() {
        let (mut state, _) = running_state();
        state.clips.add_clip("needle", false);
        state.clips.add_clip("haystack", false);
        settle(&mut state).await;

        press(&mut state, KeyCode::Char('/'));
        type_text(&mut state, "need");
        assert_eq!(state.visible.len(), 1);

        press(&mut state, KeyCode::Backspace);
        assert_eq!(state.search_query, "nee");

        press(&mut state, KeyCode::Esc);
        assert_eq!(state.mode, Mode::Navigate);
        assert!(state.search_query.is_empty());
        assert_eq!(state.visible.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_toggle_trim_setting() {
        let (mut state, _) = running_state();
        assert!(!state.snapshot.trim_spaces);

        press(&mut state, KeyCode::Char('t'));
        settle(&mut state).await;

        assert!(state.snapshot.trim_spaces);
    }

    #[tokio::test(start_paused = true)]
    async fn test_help_and_quit() {
        let (mut state, _) = running_state();
        press(&mut state, KeyCode::Char('?'));
        assert!(state.show_help);
        press(&mut state, KeyCode::Char('q'));
        assert!(!state.show_help);
        assert!(!state.should_quit);

        press(&mut state, KeyCode::Char('q'));
        assert!(state.should_quit);
    }
}
