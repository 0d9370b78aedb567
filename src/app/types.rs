use commentree::api::{CommentError, CommentId, CommentNode, NewComment};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    CommentList,
    /// 新規コメント / 返信フォーム
    Compose,
    Help,
}

/// GET /api/comments の結果
pub type LoadResult = Result<Vec<CommentNode>, CommentError>;

/// POST の結果（送信したリクエストと対にして返す）
#[derive(Debug)]
pub struct SubmitOutcome {
    pub request: NewComment,
    pub result: Result<Option<CommentId>, CommentError>,
}

/// DELETE の結果
#[derive(Debug)]
pub struct DeleteOutcome {
    pub id: CommentId,
    pub result: Result<(), CommentError>,
}

/// 選択中のコメント行
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedComment {
    pub id: CommentId,
    pub author: String,
    pub deleted: bool,
}
