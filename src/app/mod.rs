use anyhow::Result;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;

use commentree::api::{CommentId, CommentsApi};
use commentree::config::Config;
use commentree::controller::{CommentTreeController, NotificationKind};
use commentree::view::rows::{self, ListRow};

use crate::ui;

mod types;
pub use types::*;

mod input;
mod polling;

const SPINNER_FRAMES: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// 結果チャネルのバッファ（応答はすべて到着順に反映する）
const RESULT_CHANNEL_CAPACITY: usize = 16;

pub struct App {
    pub config: Config,
    pub state: AppState,
    /// Help など汎用的な戻り先
    pub previous_state: AppState,
    pub controller: CommentTreeController,
    api: Arc<dyn CommentsApi>,
    /// コメント一覧の選択行（flatten 後のインデックス）
    pub selected_row: usize,
    pub list_scroll_offset: usize,
    /// 返信セクションを折りたたんだコメント（クライアント側のみ）
    pub collapsed_replies: HashSet<CommentId>,
    /// ヘルプ画面のスクロールオフセット（行単位）
    pub help_scroll_offset: usize,
    pub should_quit: bool,
    /// Spinner animation frame counter (incremented each tick)
    pub spinner_frame: usize,
    /// 次のティックで外部エディタを開く
    editor_requested: bool,
    // 送信側はリクエストごとに clone する
    load_tx: mpsc::Sender<LoadResult>,
    load_rx: mpsc::Receiver<LoadResult>,
    submit_tx: mpsc::Sender<SubmitOutcome>,
    submit_rx: mpsc::Receiver<SubmitOutcome>,
    delete_tx: mpsc::Sender<DeleteOutcome>,
    delete_rx: mpsc::Receiver<DeleteOutcome>,
}

impl App {
    pub fn new(config: Config, api: Arc<dyn CommentsApi>) -> Self {
        let (load_tx, load_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let (submit_tx, submit_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);
        let (delete_tx, delete_rx) = mpsc::channel(RESULT_CHANNEL_CAPACITY);

        Self {
            controller: CommentTreeController::new(config.controller_options()),
            config,
            state: AppState::CommentList,
            previous_state: AppState::CommentList,
            api,
            selected_row: 0,
            list_scroll_offset: 0,
            collapsed_replies: HashSet::new(),
            help_scroll_offset: 0,
            should_quit: false,
            spinner_frame: 0,
            editor_requested: false,
            load_tx,
            load_rx,
            submit_tx,
            submit_rx,
            delete_tx,
            delete_rx,
        }
    }

    pub async fn run(&mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;

        self.request_load();

        while !self.should_quit {
            self.spinner_frame = self.spinner_frame.wrapping_add(1);
            self.poll_updates();
            terminal.draw(|frame| ui::render(frame, self))?;
            self.handle_input().await?;

            if std::mem::take(&mut self.editor_requested) {
                // Restore terminal before opening editor
                ui::restore_terminal(&mut terminal)?;
                self.compose_in_editor();
                // Re-setup terminal after editor closes
                terminal = ui::setup_terminal()?;
            }
        }

        ui::restore_terminal(&mut terminal)?;
        Ok(())
    }

    /// Get the current spinner character for loading animations
    pub fn spinner_char(&self) -> &str {
        SPINNER_FRAMES[self.spinner_frame % SPINNER_FRAMES.len()]
    }

    pub fn server_url(&self) -> &str {
        &self.config.server.base_url
    }

    // ---- requests ----

    /// GET を発行する。並行した応答は到着順に反映され、最後のものが残る
    pub(crate) fn request_load(&mut self) {
        self.controller.begin_load();
        let api = Arc::clone(&self.api);
        let tx = self.load_tx.clone();
        tokio::spawn(async move {
            let result = api.fetch_comments().await;
            let _ = tx.send(result).await;
        });
    }

    /// フォームの内容を送信する（検証エラー・送信中は何もしない）
    pub(crate) fn submit_form(&mut self) {
        let Some(request) = self.controller.prepare_form_submission() else {
            return;
        };
        let api = Arc::clone(&self.api);
        let tx = self.submit_tx.clone();
        tokio::spawn(async move {
            let result = api.add_comment(&request).await;
            let _ = tx.send(SubmitOutcome { request, result }).await;
        });
    }

    /// 確認済みの削除を発行する
    pub(crate) fn confirm_delete(&mut self) {
        let Some(id) = self.controller.take_confirmed_delete() else {
            return;
        };
        let api = Arc::clone(&self.api);
        let tx = self.delete_tx.clone();
        tokio::spawn(async move {
            let result = api.delete_comment(&id).await;
            let _ = tx.send(DeleteOutcome { id, result }).await;
        });
    }

    pub(crate) fn request_editor(&mut self) {
        self.editor_requested = true;
    }

    /// 外部エディタで本文を編集する。呼び出し側で端末を退避しておくこと
    fn compose_in_editor(&mut self) {
        let reply_to = self.controller.reply_target().map(|t| t.author.clone());
        match crate::editor::open_comment_editor(
            self.config.editor.as_deref(),
            reply_to.as_deref(),
            &self.controller.form.comment,
        ) {
            Ok(Some(body)) => {
                self.controller.form.comment = body;
                self.controller.form.focus = commentree::controller::ComposeField::Comment;
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "editor failed");
                self.controller
                    .notify(NotificationKind::Error, format!("Editor failed: {:#}", e));
            }
        }
    }

    // ---- selection ----

    pub fn row_count(&self) -> usize {
        rows::flatten(&self.controller.view(), &self.collapsed_replies).len()
    }

    pub fn selected_comment(&self) -> Option<SelectedComment> {
        let view = self.controller.view();
        let rows = rows::flatten(&view, &self.collapsed_replies);
        rows.get(self.selected_row)
            .and_then(ListRow::comment)
            .map(|row| SelectedComment {
                id: row.node.id.clone(),
                author: row.node.name.clone(),
                deleted: row.node.deleted,
            })
    }

    pub fn is_load_more_selected(&self) -> bool {
        let view = self.controller.view();
        rows::flatten(&view, &self.collapsed_replies)
            .get(self.selected_row)
            .is_some_and(ListRow::is_load_more)
    }

    pub(crate) fn clamp_selection(&mut self) {
        let count = self.row_count();
        if self.selected_row >= count {
            self.selected_row = count.saturating_sub(1);
        }
    }

    /// 再読込後、作成されたコメントがあればそれを選択する
    pub(crate) fn select_comment(&mut self, id: &CommentId) -> bool {
        let view = self.controller.view();
        let position = rows::position_of(&rows::flatten(&view, &self.collapsed_replies), id);
        match position {
            Some(index) => {
                self.selected_row = index;
                true
            }
            None => false,
        }
    }

    /// 選択中コメントの返信セクションを開閉する
    pub(crate) fn toggle_selected_replies(&mut self) -> bool {
        let view = self.controller.view();
        let rows = rows::flatten(&view, &self.collapsed_replies);
        let Some(row) = rows.get(self.selected_row).and_then(ListRow::comment) else {
            return false;
        };
        if row.reply_count == 0 {
            return false;
        }
        let id = row.node.id.clone();
        if !self.collapsed_replies.remove(&id) {
            self.collapsed_replies.insert(id);
        }
        true
    }

    // ---- status ----

    pub fn is_pending_delete_confirmation(&self) -> bool {
        self.controller.pending_delete().is_some()
    }

    /// Build footer text for the delete confirmation prompt.
    pub fn delete_confirmation_footer_text(&self) -> String {
        format!(
            "{} y: confirm | n/Esc: cancel",
            commentree::controller::DELETE_CONFIRMATION
        )
    }

    /// 進行中のリクエストの説明
    pub fn busy_label(&self) -> Option<&'static str> {
        if self.controller.is_submitting() {
            Some("Submitting...")
        } else if self.controller.is_deleting() {
            Some("Deleting...")
        } else if self.controller.is_loading() {
            Some("Loading comments...")
        } else {
            None
        }
    }
}
