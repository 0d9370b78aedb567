use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use commentree::controller::{Notification, NotificationKind};

use crate::app::{App, AppState};

/// Render the footer: delete confirmation, in-flight request, notification, then key hints.
pub fn render_status_bar(frame: &mut Frame, area: Rect, app: &App) {
    let line = if app.is_pending_delete_confirmation() {
        Line::from(Span::styled(
            app.delete_confirmation_footer_text(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ))
    } else {
        let busy = app
            .busy_label()
            .map(|label| format!("{} {}", app.spinner_char(), label));
        Line::from(status_spans(
            key_hints(app),
            busy,
            app.controller.notification(),
        ))
    };

    let footer = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

/// キーヒント、進行中のリクエスト、通知を並べる
///
/// 通知の TTL はリクエスト中も進むため、スピナーと同時に表示する。
fn status_spans(
    hints: String,
    busy: Option<String>,
    notification: Option<&Notification>,
) -> Vec<Span<'static>> {
    let mut spans = vec![Span::raw(hints)];
    if let Some(busy) = busy {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(busy, Style::default().fg(Color::Yellow)));
    }
    if let Some(notification) = notification {
        let (mark, color) = match notification.kind {
            NotificationKind::Success => ("✓", Color::Green),
            NotificationKind::Error => ("✗", Color::Red),
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("{} {} ({})", mark, notification.message, notification.timestamp),
            Style::default().fg(color),
        ));
    }
    spans
}

fn key_hints(app: &App) -> String {
    let kb = &app.config.keybindings;
    match app.state {
        AppState::Compose => {
            "Tab: switch field | Ctrl-s: submit | Ctrl-e: editor | Esc: close".to_string()
        }
        _ => format!(
            "j/k: move | {}: comment | {}: reply | {}: delete | {}: fold | {}: more | {}: refresh | ?: help | q: quit",
            kb.comment, kb.reply, kb.delete, kb.toggle_replies, kb.load_more, kb.refresh
        ),
    }
}

/// Truncate to a display width, respecting wide characters.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    let budget = max_width.saturating_sub(3);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(ch);
    }
    out.push_str("...");
    out
}
