use crate::app::{AppState, Mode};
use crate::clip::Clip;
use crate::utils::unicode::{next_char_boundary, single_line, truncate_to_width};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
};
use unicode_width::UnicodeWidthStr;

const DATE_FORMAT: &str = "%b %d %H:%M";

pub fn render(f: &mut Frame, state: &AppState, area: Rect) {
    let available_width = area.width.saturating_sub(2) as usize;
    let (items, selected_row) = build_rows(state, available_width);

    let title = format!(
        " Clipdeck · Pinned: {} · Recent: {} ",
        state.snapshot.pinned_count(),
        state.snapshot.recent_count()
    );

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .style(Style::default().fg(state.theme.foreground));

    let mut list_state = ListState::default().with_selected(selected_row);
    f.render_stateful_widget(list, area, &mut list_state);
}

/// Lays out the pinned section followed by the recent section. Returns the
/// rows and the row index of the cursor so the list scrolls to it.
fn build_rows(state: &AppState, width: usize) -> (Vec<ListItem<'static>>, Option<usize>) {
    let mut rows: Vec<ListItem<'static>> = Vec::new();
    let mut selected_row = None;
    let split = state.pinned_visible();
    let (pinned, recent) = state.visible.split_at(split);

    rows.push(section_header("Pinned", state));
    if pinned.is_empty() {
        rows.push(placeholder("No pinned clips", state));
    }
    for (idx, clip) in pinned.iter().enumerate() {
        if idx == state.cursor_position {
            selected_row = Some(rows.len());
        }
        rows.push(clip_row(state, clip, idx, width));
    }

    rows.push(ListItem::new(Line::from("")));
    rows.push(section_header("Recent", state));

    if state.mode == Mode::Edit && state.is_adding_clip {
        selected_row = Some(rows.len());
        rows.push(ListItem::new(edit_line(state, "+ ")));
    }

    if recent.is_empty() && !(state.mode == Mode::Edit && state.is_adding_clip) {
        rows.push(placeholder("No recent clips", state));
    }
    for (offset, clip) in recent.iter().enumerate() {
        let idx = split + offset;
        if idx == state.cursor_position && selected_row.is_none() {
            selected_row = Some(rows.len());
        }
        rows.push(clip_row(state, clip, idx, width));
    }

    (rows, selected_row)
}

fn section_header(label: &str, state: &AppState) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        format!(" {label}"),
        Style::default()
            .fg(state.theme.muted)
            .add_modifier(Modifier::BOLD),
    )))
}

fn placeholder(text: &str, state: &AppState) -> ListItem<'static> {
    ListItem::new(Line::from(Span::styled(
        format!("   {text}"),
        Style::default()
            .fg(state.theme.muted)
            .add_modifier(Modifier::ITALIC),
    )))
}

fn clip_row(state: &AppState, clip: &Clip, idx: usize, width: usize) -> ListItem<'static> {
    let is_cursor = idx == state.cursor_position;
    let is_editing = state.mode == Mode::Edit
        && !state.is_adding_clip
        && state.editing_id == Some(clip.id);

    let marker = if clip.is_pinned { "★ " } else { "  " };

    if is_editing {
        return ListItem::new(edit_line(state, marker));
    }

    let date = clip.date_added.format(DATE_FORMAT).to_string();
    let prefix = format!(" {marker}");
    // prefix, one space, date
    let text_width = width.saturating_sub(prefix.chars().count() + date.len() + 2);
    let text = truncate_to_width(&single_line(&clip.text), text_width);
    let padding = text_width.saturating_sub(text.width());

    let text_style = if is_cursor && state.mode == Mode::Navigate {
        Style::default()
            .fg(state.theme.cursor)
            .add_modifier(Modifier::REVERSED)
    } else if clip.is_pinned {
        Style::default().fg(state.theme.pinned)
    } else {
        Style::default().fg(state.theme.foreground)
    };

    ListItem::new(Line::from(vec![
        Span::styled(prefix, Style::default().fg(state.theme.pinned)),
        Span::styled(text, text_style),
        Span::raw(" ".repeat(padding + 1)),
        Span::styled(date, Style::default().fg(state.theme.muted)),
    ]))
}

fn edit_line(state: &AppState, marker: &str) -> Line<'static> {
    let buffer = &state.edit_buffer;
    let pos = state.edit_cursor_pos.min(buffer.len());
    let before = flatten(&buffer[..pos]);

    let cursor_style = Style::default()
        .bg(state.theme.cursor)
        .fg(state.theme.background)
        .add_modifier(Modifier::BOLD);

    let mut spans = vec![
        Span::styled(format!(" {marker}"), Style::default().fg(state.theme.pinned)),
        Span::raw(before),
    ];

    if pos < buffer.len() {
        let end = next_char_boundary(buffer, pos);
        spans.push(Span::styled(flatten(&buffer[pos..end]), cursor_style));
        spans.push(Span::raw(flatten(&buffer[end..])));
    } else {
        spans.push(Span::styled(
            "█",
            Style::default()
                .fg(state.theme.cursor)
                .add_modifier(Modifier::BOLD),
        ));
    }

    Line::from(spans)
}

// Unlike `single_line`, keeps runs of spaces so the cursor lines up.
fn flatten(s: &str) -> String {
    s.replace(['\n', '\r', '\t'], " ")
}
