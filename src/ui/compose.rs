use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use commentree::controller::ComposeField;

use crate::app::App;

/// Render the comment / reply form.
pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let controller = &app.controller;
    let form = &controller.form;

    let title_style = if controller.reply_target().is_some() {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let submit_style = if controller.is_submitting() {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default().fg(Color::Green)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(controller.form_label(), title_style))
        .title_bottom(Line::from(Span::styled(
            format!(" [Ctrl-s] {} ", controller.submit_label()),
            submit_style,
        )));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(inner);

    let name = Paragraph::new(Line::from(vec![
        Span::styled("Name *   ", field_label_style(form.focus == ComposeField::Name)),
        Span::raw(form.name.clone()),
        cursor(form.focus == ComposeField::Name),
    ]));
    frame.render_widget(name, chunks[0]);

    let comment_focused = form.focus == ComposeField::Comment;
    let mut comment_lines: Vec<Line> = form
        .comment
        .split('\n')
        .enumerate()
        .map(|(i, text)| {
            let label = if i == 0 {
                Span::styled("Comment  ", field_label_style(comment_focused))
            } else {
                Span::raw("         ")
            };
            Line::from(vec![label, Span::raw(text.to_string())])
        })
        .collect();
    if let Some(last) = comment_lines.last_mut() {
        last.spans.push(cursor(comment_focused));
    }

    let comment = Paragraph::new(comment_lines).wrap(Wrap { trim: false });
    frame.render_widget(comment, chunks[1]);
}

fn field_label_style(focused: bool) -> Style {
    if focused {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

fn cursor(focused: bool) -> Span<'static> {
    if focused {
        Span::styled("▏", Style::default().fg(Color::Yellow))
    } else {
        Span::raw("")
    }
}
