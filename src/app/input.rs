use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use commentree::controller::ComposeField;

use super::{App, AppState};

impl App {
    pub(crate) async fn handle_input(&mut self) -> Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // Kitty keyboard protocol が有効な場合、Release/Repeat イベントも
                // 報告されるため、Press のみ処理して二重実行を防止する。
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }
                self.handle_key(key);
            }
        }
        Ok(())
    }

    pub(crate) fn handle_key(&mut self, key: KeyEvent) {
        match self.state {
            AppState::CommentList => self.handle_comment_list_input(key),
            AppState::Compose => self.handle_compose_input(key),
            AppState::Help => self.handle_help_input(key),
        }
    }

    fn handle_comment_list_input(&mut self, key: KeyEvent) {
        // 削除確認中は y / n / Esc のみ
        if self.is_pending_delete_confirmation() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => self.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.controller.cancel_delete()
                }
                _ => {}
            }
            return;
        }

        let kb = self.config.keybindings.clone();

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_row + 1 < self.row_count() {
                    self.selected_row += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_row = self.selected_row.saturating_sub(1);
            }
            KeyCode::Char('g') | KeyCode::Home => self.selected_row = 0,
            KeyCode::Char('G') | KeyCode::End => {
                self.selected_row = self.row_count().saturating_sub(1);
            }
            KeyCode::Enter if self.is_load_more_selected() => {
                self.controller.load_more();
            }
            KeyCode::Char('?') => {
                self.previous_state = self.state;
                self.state = AppState::Help;
            }
            KeyCode::Esc => {
                if self.controller.reply_target().is_some() {
                    self.controller.cancel_reply();
                } else {
                    self.controller.dismiss_notification();
                }
            }
            KeyCode::Char(' ') => {
                self.toggle_selected_replies();
            }
            KeyCode::Char(c) if c == kb.toggle_replies => {
                self.toggle_selected_replies();
            }
            KeyCode::Char(c) if c == kb.load_more => {
                self.controller.load_more();
            }
            KeyCode::Char(c) if c == kb.refresh => self.request_load(),
            KeyCode::Char(c) if c == kb.comment => self.open_compose(),
            KeyCode::Char(c) if c == kb.reply => self.start_reply_on_selection(),
            KeyCode::Char(c) if c == kb.delete => {
                if let Some(selected) = self.selected_comment() {
                    self.controller.request_delete(&selected.id);
                }
            }
            KeyCode::Char(c) if c == kb.editor => {
                self.state = AppState::Compose;
                self.request_editor();
            }
            _ => {}
        }
    }

    /// 新規コメントフォームを開く（返信先は解除）
    fn open_compose(&mut self) {
        self.controller.cancel_reply();
        self.controller.form.focus = ComposeField::Name;
        self.state = AppState::Compose;
    }

    fn start_reply_on_selection(&mut self) {
        let Some(selected) = self.selected_comment() else {
            return;
        };
        if self.controller.start_reply(&selected.id, &selected.author) {
            if self.controller.form.name.trim().is_empty() {
                self.controller.form.focus = ComposeField::Name;
            }
            self.state = AppState::Compose;
        }
    }

    fn handle_compose_input(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => {
                self.controller.cancel_reply();
                self.state = AppState::CommentList;
            }
            KeyCode::Char('s') if ctrl => self.submit_form(),
            KeyCode::Char('e') if ctrl => self.request_editor(),
            KeyCode::Tab | KeyCode::BackTab => self.controller.form.toggle_focus(),
            KeyCode::Enter => match self.controller.form.focus {
                ComposeField::Name => self.controller.form.focus = ComposeField::Comment,
                ComposeField::Comment => self.controller.form.comment.push('\n'),
            },
            KeyCode::Backspace => {
                self.controller.form.focused_mut().pop();
            }
            KeyCode::Char(c) if !ctrl => self.controller.form.focused_mut().push(c),
            _ => {}
        }
    }

    fn handle_help_input(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') | KeyCode::Char('?') | KeyCode::Esc => {
                self.state = self.previous_state;
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.help_scroll_offset = self.help_scroll_offset.saturating_add(1);
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.help_scroll_offset = self.help_scroll_offset.saturating_sub(1);
            }
            KeyCode::Char('g') => self.help_scroll_offset = 0,
            _ => {}
        }
    }
}
