use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
    Frame,
};

use commentree::config::KeybindingsConfig;

use crate::app::App;

/// Format a key display with padding for alignment
fn fmt_key(key: &str, width: usize) -> String {
    format!("  {:<width$}", key, width = width)
}

pub fn render(frame: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(0),    // Help content
        ])
        .split(frame.area());

    let title = Paragraph::new("commentree - nested comment threads")
        .style(
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .block(Block::default().borders(Borders::ALL).title("Help"));
    frame.render_widget(title, chunks[0]);

    let help_lines = build_help_lines(&app.config.keybindings);
    let total_lines = help_lines.len();
    // Content area height (subtract 2 for borders)
    let content_height = chunks[1].height.saturating_sub(2) as usize;

    // Clamp scroll offset so we don't scroll past content
    let max_scroll = total_lines.saturating_sub(content_height);
    if app.help_scroll_offset > max_scroll {
        app.help_scroll_offset = max_scroll;
    }

    let help = Paragraph::new(help_lines)
        .block(Block::default().borders(Borders::ALL).title("Keybindings"))
        .scroll((app.help_scroll_offset as u16, 0));
    frame.render_widget(help, chunks[1]);

    if total_lines > content_height {
        let mut scrollbar_state =
            ScrollbarState::new(max_scroll + 1).position(app.help_scroll_offset);
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(None)
            .end_symbol(None);
        frame.render_stateful_widget(
            scrollbar,
            chunks[1].inner(ratatui::layout::Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

fn section(title: &'static str) -> Line<'static> {
    Line::from(vec![Span::styled(
        title,
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
    )])
}

fn entry(key: &str, description: &str) -> Line<'static> {
    Line::from(format!("{}  {}", fmt_key(key, 14), description))
}

fn build_help_lines(kb: &KeybindingsConfig) -> Vec<Line<'static>> {
    vec![
        Line::from(""),
        section("Comment List"),
        entry("j/k, Down/Up", "Move selection"),
        entry("g/G", "Jump to top/bottom"),
        entry(&kb.comment.to_string(), "Write a new comment"),
        entry(&kb.reply.to_string(), "Reply to selected comment"),
        entry(&kb.delete.to_string(), "Delete selected comment (y/n to confirm)"),
        entry(
            &format!("{}, Space", kb.toggle_replies),
            "Collapse/expand replies of selected comment",
        ),
        entry(
            &format!("{}, Enter", kb.load_more),
            "Load more top-level comments",
        ),
        entry(&kb.refresh.to_string(), "Reload comments from the server"),
        entry(&kb.editor.to_string(), "Compose comment in external editor"),
        entry("Esc", "Cancel reply / dismiss notification"),
        entry("q", "Quit"),
        Line::from(""),
        section("Compose Form"),
        entry("Tab", "Switch between name and comment"),
        entry("Enter", "Next field / new line"),
        entry("Ctrl-s", "Submit"),
        entry("Ctrl-e", "Edit comment in external editor"),
        entry("Esc", "Close form (draft is kept)"),
        Line::from(""),
        Line::from(vec![Span::styled(
            "  Configure in ~/.config/commentree/config.toml (run `ctree init`)",
            Style::default().fg(Color::DarkGray),
        )]),
        Line::from(""),
        Line::from(vec![Span::styled(
            "Press q, ? or Esc to close this help | j/k: scroll",
            Style::default().fg(Color::DarkGray),
        )]),
    ]
}
