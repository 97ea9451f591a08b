pub mod clip_list;
pub mod status_bar;

use crate::app::{AppState, Mode};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

pub fn render(f: &mut Frame, state: &AppState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Search line
            Constraint::Min(1),    // Clip list
            Constraint::Length(1), // Status bar
        ])
        .split(f.area());

    render_search_line(f, state, chunks[0]);
    clip_list::render(f, state, chunks[1]);
    status_bar::render(f, state, chunks[2]);

    if state.show_help {
        render_help_overlay(f, state);
    }
}

fn render_search_line(f: &mut Frame, state: &AppState, area: Rect) {
    let line = if state.mode == Mode::Search {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(state.theme.search)),
            Span::raw(state.search_query.clone()),
            Span::styled("█", Style::default().fg(state.theme.search)),
        ])
    } else if !state.search_query.is_empty() {
        Line::from(vec![
            Span::styled(" / ", Style::default().fg(state.theme.search)),
            Span::styled(
                state.search_query.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                format!("  ({} matches, Esc to clear)", state.visible.len()),
                Style::default().fg(state.theme.muted),
            ),
        ])
    } else {
        Line::from(Span::styled(
            " Press / to search clips",
            Style::default().fg(state.theme.muted),
        ))
    };

    f.render_widget(Paragraph::new(line), area);
}

fn render_help_overlay(f: &mut Frame, state: &AppState) {
    let help_text = r#"
    Clipdeck Help

    Navigate Mode:
      ↑/↓ or j/k            Move cursor
      Enter or c            Copy clip to the clipboard
      p                     Pin / unpin clip
      e or i                Edit clip text
      n                     Add a clip by hand
      d                     Delete clip
      X                     Clear all recent (unpinned) clips
      /                     Search
      Esc                   Clear search
      t                     Toggle trimming spaces on new clips
      ?                     Toggle help
      q                     Quit

    Edit Mode:
      Esc                   Cancel edit
      Enter                 Save and exit
      ←/→                   Move cursor
      Home/End              Jump to start/end
      Backspace/Delete      Delete character
    "#;

    let area = centered_rect(60, 70, f.area());

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(state.theme.background));

    let paragraph = Paragraph::new(help_text)
        .block(block)
        .style(Style::default().fg(state.theme.foreground))
        .wrap(Wrap { trim: true });

    f.render_widget(Clear, area);
    f.render_widget(paragraph, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(r);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}
