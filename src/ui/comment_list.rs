use ratatui::{
    layout::{Constraint, Direction, Layout, Margin},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{
        Block, Borders, List, ListItem, ListState, Paragraph, Scrollbar, ScrollbarOrientation,
        ScrollbarState,
    },
    Frame,
};

use commentree::view::rows::{self, CommentRow, ListRow};

use super::common::{render_status_bar, truncate_to_width};
use super::compose;
use crate::app::{App, AppState};

/// Compose panel height including borders
const COMPOSE_HEIGHT: u16 = 9;

pub fn render(frame: &mut Frame, app: &mut App) {
    let mut constraints = vec![
        Constraint::Length(3), // Header
        Constraint::Min(0),    // Comment list
    ];
    if app.state == AppState::Compose {
        constraints.push(Constraint::Length(COMPOSE_HEIGHT));
    }
    constraints.push(Constraint::Length(3)); // Footer

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(frame.area());

    // Header
    let view = app.controller.view();
    let header_text = format!("{} | {}", view.count_label, app.server_url());
    let header = Paragraph::new(header_text)
        .block(Block::default().borders(Borders::ALL).title("commentree"));
    frame.render_widget(header, chunks[0]);

    let list_area = chunks[1];
    if !app.controller.is_loaded() {
        // 初回ローディング（失敗時は通知バーにエラーが出る）
        let text = if app.controller.is_loading() {
            format!("{} Loading comments...", app.spinner_char())
        } else {
            "Failed to load comments (R: retry)".to_string()
        };
        let loading =
            Paragraph::new(text).block(Block::default().borders(Borders::ALL).title("Comments"));
        frame.render_widget(loading, list_area);
    } else if view.is_empty() {
        let empty = Paragraph::new("No comments yet. Be the first to share your thoughts!")
            .style(Style::default().fg(Color::DarkGray))
            .block(Block::default().borders(Borders::ALL).title("Comments"));
        frame.render_widget(empty, list_area);
    } else {
        let list_rows = rows::flatten(&view, &app.collapsed_replies);
        let body_width = list_area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = list_rows
            .iter()
            .map(|row| build_item(row, body_width))
            .collect();
        let total_rows = items.len();
        let selected = app.selected_row.min(total_rows.saturating_sub(1));

        let title = format!(
            "Comments ({}/{} top-level){}",
            app.controller.visible_count(),
            view.top_level_count,
            if app.controller.is_loading() {
                format!(" {}", app.spinner_char())
            } else {
                String::new()
            }
        );

        // Use ListState for stateful rendering with automatic scroll management
        let mut list_state = ListState::default()
            .with_offset(app.list_scroll_offset)
            .with_selected(Some(selected));

        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(Color::DarkGray));
        frame.render_stateful_widget(list, list_area, &mut list_state);

        // Update scroll offset from ListState for next frame
        app.list_scroll_offset = list_state.offset();

        if total_rows > 1 {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("▲"))
                .end_symbol(Some("▼"));
            let mut scrollbar_state =
                ScrollbarState::new(total_rows.saturating_sub(1)).position(selected);
            frame.render_stateful_widget(
                scrollbar,
                list_area.inner(Margin {
                    vertical: 1,
                    horizontal: 0,
                }),
                &mut scrollbar_state,
            );
        }
    }

    let footer_idx = if app.state == AppState::Compose {
        compose::render(frame, chunks[2], app);
        3
    } else {
        2
    };
    render_status_bar(frame, chunks[footer_idx], app);
}

fn build_item(row: &ListRow<'_>, width: usize) -> ListItem<'static> {
    match row {
        ListRow::Comment(comment) => ListItem::new(comment_lines(comment, width)),
        ListRow::LoadMore { remaining } => ListItem::new(Line::from(Span::styled(
            format!("  ▼ Load more ({} remaining)", remaining),
            Style::default()
                .fg(Color::Blue)
                .add_modifier(Modifier::BOLD),
        ))),
    }
}

/// 1コメント分の行（ヘッダ + 本文）
fn comment_lines(row: &CommentRow<'_>, width: usize) -> Vec<Line<'static>> {
    let node = row.node;
    let indent = "│ ".repeat(row.indent_level);
    // 最大インデントより深い返信は深さを数字で示す
    let depth_marker = if row.depth > row.indent_level {
        format!("↳{} ", row.depth)
    } else {
        String::new()
    };

    let mut header = vec![
        Span::styled(indent.clone(), Style::default().fg(Color::DarkGray)),
        Span::raw(depth_marker),
        Span::styled(
            node.name.clone(),
            if node.deleted {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD)
            },
        ),
    ];
    if node.deleted {
        header.push(Span::styled(
            " [Deleted]",
            Style::default().fg(Color::DarkGray),
        ));
    }
    header.push(Span::styled(
        format!("  {}", node.timestamp()),
        Style::default().fg(Color::DarkGray),
    ));
    if row.reply_count > 0 {
        header.push(Span::styled(
            format!(
                "  {} {} repl{}",
                if row.collapsed { "▸" } else { "▾" },
                row.reply_count,
                if row.reply_count == 1 { "y" } else { "ies" }
            ),
            Style::default().fg(Color::Magenta),
        ));
    }
    if row.reply_form_open {
        header.push(Span::styled(
            "  ✎ replying",
            Style::default().fg(Color::Yellow),
        ));
    }

    let body_style = if node.deleted {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::ITALIC)
    } else {
        Style::default()
    };
    let body_width = width.saturating_sub(indent.chars().count() + 2);

    let mut lines = vec![Line::from(header)];
    lines.extend(node.comment.split('\n').map(|text| {
        Line::from(vec![
            Span::styled(indent.clone(), Style::default().fg(Color::DarkGray)),
            Span::raw("  "),
            Span::styled(truncate_to_width(text, body_width), body_style),
        ])
    }));
    lines
}
