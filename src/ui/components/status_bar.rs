use crate::app::{AppState, Mode};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};
use unicode_width::UnicodeWidthStr;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub fn render(f: &mut Frame, state: &AppState, area: Rect) {
    let base_style = Style::default()
        .fg(state.theme.status_bar_fg)
        .bg(state.theme.status_bar_bg);

    let status_line = status_line(state, area.width as usize);
    let style = if state.status_message.is_some() {
        base_style.add_modifier(Modifier::BOLD)
    } else {
        base_style
    };

    let status = Paragraph::new(Line::from(vec![Span::styled(status_line, style)]));
    f.render_widget(status, area);
}

fn status_line(state: &AppState, width: usize) -> String {
    let trim_indicator = if state.snapshot.trim_spaces {
        " | trim on"
    } else {
        ""
    };
    let editing_indicator = if state.snapshot.editing_clip_id.is_some() {
        " [editing]"
    } else {
        ""
    };

    let left_content = match state.status_text() {
        Some(message) => format!(" {} | {message}", state.mode),
        None => format!(
            " {} | {} clips{}{}",
            state.mode,
            state.snapshot.clips.len(),
            trim_indicator,
            editing_indicator
        ),
    };

    let hint = match state.mode {
        Mode::Navigate => "? help  q quit",
        Mode::Search => "Enter done  Esc clear",
        Mode::Edit => "Enter save  Esc cancel",
    };
    let version_text = format!("v{VERSION}");

    let padding = width.saturating_sub(left_content.width() + hint.width() + version_text.len() + 3);

    format!(
        "{} {} {:>padding$} {}",
        left_content,
        hint,
        "",
        version_text,
        padding = padding
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::tests::{running_state, settle};

    #[tokio::test(start_paused = true)]
    async fn test_status_line_shows_counts_and_trim() {
        let (mut state, _) = running_state();
        state.clips.add_clip("one", false);
        state.clips.set_trim_spaces(true);
        settle(&mut state).await;

        let line = status_line(&state, 80);
        assert!(line.starts_with(" NAVIGATE | 1 clips | trim on"));
        assert!(line.ends_with(&format!("v{VERSION}")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_message_replaces_counts() {
        let (mut state, _) = running_state();
        state.set_status_message("Copied to clipboard");

        let line = status_line(&state, 80);
        assert!(line.contains("Copied to clipboard"));
        assert!(!line.contains("clips"));
    }
}
