//! Comment tree controller.
//!
//! Owns the loaded forest and the client-side view state. Network work is split
//! into a synchronous `prepare_*` / `apply_*` pair so the terminal app can run the
//! request on a spawned task and feed the result back in; the async helpers
//! (`load_all`, `submit_comment`, `confirm_delete`) chain the two for callers that
//! can simply await.

use std::time::Instant;

use tracing::{debug, info, warn};

use crate::api::{CommentError, CommentId, CommentNode, CommentsApi, NewComment};
use crate::tree;
use crate::view::{markup, CommentsView};

mod types;
pub use types::*;


pub struct CommentTreeController {
    options: ControllerOptions,
    forest: Vec<CommentNode>,
    total_count: usize,
    view_state: ClientViewState,
    /// 一度でも読み込みに成功したか
    loaded: bool,
    /// 応答待ちの GET 数（後から届いた応答が常に勝つ）
    pending_loads: usize,
    submitting: bool,
    deleting: bool,
    /// 削除確認待ちのコメント
    pending_delete: Option<CommentId>,
    pub form: ComposeForm,
    notification: Option<Notification>,
    /// 直近に作成されたコメント（再読込後の選択用）
    last_created: Option<CommentId>,
}

impl Default for CommentTreeController {
    fn default() -> Self {
        Self::new(ControllerOptions::default())
    }
}

impl CommentTreeController {
    pub fn new(options: ControllerOptions) -> Self {
        Self {
            view_state: ClientViewState::new(options.page_size),
            options,
            forest: Vec::new(),
            total_count: 0,
            loaded: false,
            pending_loads: 0,
            submitting: false,
            deleting: false,
            pending_delete: None,
            form: ComposeForm::default(),
            notification: None,
            last_created: None,
        }
    }

    pub fn options(&self) -> &ControllerOptions {
        &self.options
    }

    pub fn forest(&self) -> &[CommentNode] {
        &self.forest
    }

    pub fn total_count(&self) -> usize {
        self.total_count
    }

    pub fn view_state(&self) -> &ClientViewState {
        &self.view_state
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_loading(&self) -> bool {
        self.pending_loads > 0
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    /// リクエストが1つでも進行中か
    pub fn is_busy(&self) -> bool {
        self.is_loading() || self.submitting || self.deleting
    }

    // ---- load ----

    /// GET の発行を記録する
    pub fn begin_load(&mut self) {
        self.pending_loads += 1;
        debug!(pending = self.pending_loads, "load started");
    }

    /// GET の結果を反映する。成功時のみフォレストを置き換える
    pub fn apply_loaded(&mut self, result: Result<Vec<CommentNode>, CommentError>) -> bool {
        self.pending_loads = self.pending_loads.saturating_sub(1);

        match result {
            Ok(forest) => {
                self.total_count = tree::count_total(&forest);
                self.forest = forest;
                self.loaded = true;
                info!(
                    top_level = self.forest.len(),
                    total = self.total_count,
                    "comments loaded"
                );

                // 返信先が消えた・削除済みになった場合はフォームを閉じる
                let target_gone = self.view_state.reply_target.as_ref().is_some_and(|target| {
                    !matches!(tree::find(&self.forest, &target.id), Some(node) if !node.deleted)
                });
                if target_gone {
                    self.cancel_reply();
                }
                if self
                    .pending_delete
                    .as_ref()
                    .is_some_and(|id| tree::find(&self.forest, id).is_none())
                {
                    self.pending_delete = None;
                }
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to load comments");
                let message = if err.is_network() {
                    err.to_string()
                } else {
                    format!(
                        "Failed to load comments: {}",
                        err.user_message("Unknown error")
                    )
                };
                self.notify(NotificationKind::Error, message);
                false
            }
        }
    }

    pub async fn load_all(&mut self, api: &dyn CommentsApi) -> bool {
        self.begin_load();
        let result = api.fetch_comments().await;
        self.apply_loaded(result)
    }

    // ---- pagination ----

    /// 表示されるトップレベル件数 `min(cursor, top-level)`
    pub fn visible_count(&self) -> usize {
        self.view_state
            .visible_top_level_count
            .min(self.forest.len())
    }

    pub fn has_more(&self) -> bool {
        self.view_state.visible_top_level_count < self.forest.len()
    }

    /// Reveal the next page of top-level comments. No-op once everything is shown.
    pub fn load_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        self.view_state.visible_top_level_count += self.options.page_size;
        debug!(
            visible = self.view_state.visible_top_level_count,
            "load more"
        );
        true
    }

    /// ヘッドレス描画用にカーソルを直接設定する
    pub fn set_visible_count(&mut self, count: usize) {
        self.view_state.visible_top_level_count = count;
    }

    // ---- reply ----

    pub fn reply_target(&self) -> Option<&ReplyTarget> {
        self.view_state.reply_target.as_ref()
    }

    /// Open the reply form for `id`, closing any other one.
    ///
    /// Unknown ids and deleted nodes are rejected; they have no reply action.
    pub fn start_reply(&mut self, id: &CommentId, author: &str) -> bool {
        match tree::find(&self.forest, id) {
            Some(node) if !node.deleted => {
                self.view_state.reply_target = Some(ReplyTarget {
                    id: id.clone(),
                    author: author.to_string(),
                });
                self.form.focus = ComposeField::Comment;
                debug!(%id, "reply started");
                true
            }
            _ => false,
        }
    }

    pub fn cancel_reply(&mut self) {
        self.view_state.reply_target = None;
    }

    pub fn form_label(&self) -> String {
        match &self.view_state.reply_target {
            Some(target) => format!("Reply to {} *", target.author),
            None => COMMENT_FORM_LABEL.to_string(),
        }
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            SUBMITTING_LABEL
        } else if self.view_state.reply_target.is_some() {
            SUBMIT_REPLY_LABEL
        } else {
            SUBMIT_COMMENT_LABEL
        }
    }

    // ---- submit ----

    /// 入力を検証し、送信するリクエストを組み立てる
    ///
    /// 送信中、または検証エラー（通知済み）の場合は `None`。
    pub fn prepare_submission(
        &mut self,
        name: &str,
        comment: &str,
        parent_id: Option<CommentId>,
    ) -> Option<NewComment> {
        if self.submitting {
            debug!("submission refused: already in flight");
            return None;
        }

        let name = name.trim();
        let comment = comment.trim();
        if name.is_empty() || comment.is_empty() {
            let field = if parent_id.is_some() { "reply" } else { "comment" };
            self.notify(
                NotificationKind::Error,
                CommentError::Validation(field).to_string(),
            );
            return None;
        }

        self.submitting = true;
        Some(NewComment {
            name: name.to_string(),
            comment: comment.to_string(),
            parent_id,
        })
    }

    /// フォームの内容と現在の返信先から送信リクエストを組み立てる
    pub fn prepare_form_submission(&mut self) -> Option<NewComment> {
        let parent = self.view_state.reply_target.as_ref().map(|t| t.id.clone());
        let name = self.form.name.clone();
        let comment = self.form.comment.clone();
        self.prepare_submission(&name, &comment, parent)
    }

    /// POST の結果を反映する。成功時は呼び出し側が再読込する
    pub fn apply_submitted(
        &mut self,
        request: &NewComment,
        result: Result<Option<CommentId>, CommentError>,
    ) -> bool {
        self.submitting = false;

        match result {
            Ok(created) => {
                info!(id = ?created, reply = request.is_reply(), "comment submitted");
                // 送信後に別のコメントへ返信を始めていたら、そのフォームは残す
                let current = self.view_state.reply_target.as_ref().map(|t| &t.id);
                if current == request.parent_id.as_ref() {
                    self.form.clear();
                    self.cancel_reply();
                } else {
                    debug!(?current, "reply target changed while submitting, keeping form");
                }
                self.last_created = created;
                let message = if request.is_reply() {
                    "Reply submitted successfully!"
                } else {
                    "Comment submitted successfully!"
                };
                self.notify(NotificationKind::Success, message);
                true
            }
            Err(err) => {
                warn!(error = %err, "failed to submit comment");
                let fallback = if request.is_reply() {
                    "Failed to submit reply"
                } else {
                    "Failed to submit comment"
                };
                self.notify(NotificationKind::Error, err.user_message(fallback));
                false
            }
        }
    }

    /// Validate, POST, then re-fetch the whole forest on success.
    pub async fn submit_comment(
        &mut self,
        api: &dyn CommentsApi,
        name: &str,
        comment: &str,
        parent_id: Option<CommentId>,
    ) -> bool {
        let Some(request) = self.prepare_submission(name, comment, parent_id) else {
            return false;
        };
        let result = api.add_comment(&request).await;
        if !self.apply_submitted(&request, result) {
            return false;
        }
        self.load_all(api).await;
        true
    }

    /// 作成されたコメントIDを取り出す
    pub fn take_last_created(&mut self) -> Option<CommentId> {
        self.last_created.take()
    }

    // ---- delete ----

    pub fn pending_delete(&self) -> Option<&CommentId> {
        self.pending_delete.as_ref()
    }

    /// 削除確認を開始する。存在しない・削除済みのコメントは対象外
    pub fn request_delete(&mut self, id: &CommentId) -> bool {
        match tree::find(&self.forest, id) {
            Some(node) if !node.deleted => {
                self.pending_delete = Some(id.clone());
                true
            }
            _ => false,
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// 確認済みの削除対象を取り出し、送信中にする
    pub fn take_confirmed_delete(&mut self) -> Option<CommentId> {
        if self.deleting {
            return None;
        }
        let id = self.pending_delete.take()?;
        self.deleting = true;
        Some(id)
    }

    /// DELETE の結果を反映する。成功時は呼び出し側が再読込する
    pub fn apply_deleted(&mut self, id: &CommentId, result: Result<(), CommentError>) -> bool {
        self.deleting = false;

        match result {
            Ok(()) => {
                info!(%id, "comment deleted");
                self.notify(NotificationKind::Success, "Comment deleted successfully!");
                true
            }
            Err(err) => {
                warn!(%id, error = %err, "failed to delete comment");
                self.notify(
                    NotificationKind::Error,
                    err.user_message("Failed to delete comment"),
                );
                false
            }
        }
    }

    /// Issue the confirmed DELETE, then re-fetch on success.
    pub async fn confirm_delete(&mut self, api: &dyn CommentsApi) -> bool {
        let Some(id) = self.take_confirmed_delete() else {
            return false;
        };
        let result = api.delete_comment(&id).await;
        if !self.apply_deleted(&id, result) {
            return false;
        }
        self.load_all(api).await;
        true
    }

    // ---- notifications ----

    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn notify(&mut self, kind: NotificationKind, message: impl Into<String>) {
        self.notification = Some(Notification::new(kind, message));
    }

    /// TTL を過ぎた通知を消す。消した場合 true
    pub fn expire_notification(&mut self, now: Instant) -> bool {
        let expired = self
            .notification
            .as_ref()
            .is_some_and(|n| n.is_expired(now, self.options.notification_ttl));
        if expired {
            self.notification = None;
        }
        expired
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    // ---- rendering ----

    pub fn view(&self) -> CommentsView<'_> {
        CommentsView::build(
            &self.forest,
            &self.view_state,
            self.options.max_indent_depth,
        )
    }

    /// 任意の表示件数で描画する（カーソルは変更しない）
    pub fn render(&self, visible_count: usize) -> CommentsView<'_> {
        let state = ClientViewState {
            visible_top_level_count: visible_count,
            reply_target: self.view_state.reply_target.clone(),
        };
        CommentsView::build(&self.forest, &state, self.options.max_indent_depth)
    }

    pub fn render_markup(&self) -> String {
        markup::render_view(&self.view())
    }
}
