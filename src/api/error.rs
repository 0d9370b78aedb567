use thiserror::Error;

/// コメント操作の失敗分類
///
/// どの失敗も通知として表示されるだけで、コントローラの状態は壊さない。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommentError {
    /// 必須フィールドが空（サーバーには送信しない）
    #[error("Please fill in both name and {0} fields")]
    Validation(&'static str),
    /// サーバーが `success: false` を返した。メッセージが無い場合は None
    #[error("{}", .0.as_deref().unwrap_or("Server reported a failure"))]
    Server(Option<String>),
    /// 通信エラー
    #[error("Network error: {0}")]
    Network(String),
}

impl CommentError {
    /// Message shown to the user, substituting `fallback` when the server gave none.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            CommentError::Server(None) => fallback.to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_network(&self) -> bool {
        matches!(self, CommentError::Network(_))
    }
}
