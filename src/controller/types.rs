use std::time::{Duration, Instant};

use crate::api::CommentId;
use crate::view::DEFAULT_MAX_INDENT_DEPTH;

/// 1回の "load more" で増やすトップレベル件数
pub const DEFAULT_PAGE_SIZE: usize = 5;

/// 通知の自動非表示までの時間
pub const DEFAULT_NOTIFICATION_TTL: Duration = Duration::from_secs(5);

pub const COMMENT_FORM_LABEL: &str = "Your Comment/Suggestion *";
pub const SUBMIT_COMMENT_LABEL: &str = "Submit Comment";
pub const SUBMIT_REPLY_LABEL: &str = "Submit Reply";
pub const SUBMITTING_LABEL: &str = "Submitting...";
pub const DELETE_CONFIRMATION: &str = "Are you sure you want to delete this comment?";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControllerOptions {
    pub page_size: usize,
    pub max_indent_depth: usize,
    pub notification_ttl: Duration,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_indent_depth: DEFAULT_MAX_INDENT_DEPTH,
            notification_ttl: DEFAULT_NOTIFICATION_TTL,
        }
    }
}

/// 返信先
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyTarget {
    pub id: CommentId,
    pub author: String,
}

/// クライアント側だけで保持する表示状態（永続化しない）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientViewState {
    pub visible_top_level_count: usize,
    /// 開いている返信フォーム（常に高々1つ）
    pub reply_target: Option<ReplyTarget>,
}

impl ClientViewState {
    pub fn new(page_size: usize) -> Self {
        Self {
            visible_top_level_count: page_size,
            reply_target: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ComposeField {
    #[default]
    Name,
    Comment,
}

/// コメント入力フォームのバッファ
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComposeForm {
    pub name: String,
    pub comment: String,
    pub focus: ComposeField,
}

impl ComposeForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            ComposeField::Name => &mut self.name,
            ComposeField::Comment => &mut self.comment,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            ComposeField::Name => ComposeField::Comment,
            ComposeField::Comment => ComposeField::Name,
        };
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// 自動で消える通知（常に最新の1件のみ）
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// HH:MM:SS
    pub timestamp: String,
    created_at: Instant,
}

impl Notification {
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self::at(kind, message, Instant::now())
    }

    pub fn at(kind: NotificationKind, message: impl Into<String>, created_at: Instant) -> Self {
        Self {
            kind,
            message: message.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
            created_at,
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind == NotificationKind::Error
    }

    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) >= ttl
    }
}
