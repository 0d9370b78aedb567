use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};

use super::client::ApiClient;
use super::error::CommentError;

/// コメントID（サーバーは文字列または数値で返すため、テキストとして保持）
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CommentId(String);

impl CommentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CommentId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u64> for CommentId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for CommentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(text) => CommentId(text),
            RawId::Number(number) => CommentId(number.to_string()),
        })
    }
}

/// コメントツリーのノード（`replies` の順序はサーバーが決める）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentNode {
    pub id: CommentId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub replies: Vec<CommentNode>,
}

impl CommentNode {
    pub fn has_replies(&self) -> bool {
        !self.replies.is_empty()
    }

    /// "date at time" 形式の表示用タイムスタンプ
    pub fn timestamp(&self) -> String {
        format!("{} at {}", self.date, self.time)
    }
}

/// POST /api/comments/add のリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewComment {
    pub name: String,
    pub comment: String,
    pub parent_id: Option<CommentId>,
}

impl NewComment {
    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }
}

#[derive(Debug, Deserialize)]
struct CommentsEnvelope {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    comments: Vec<CommentNode>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreatedComment {
    id: CommentId,
}

#[derive(Debug, Deserialize)]
struct AddCommentEnvelope {
    #[serde(default)]
    success: bool,
    comment: Option<CreatedComment>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusEnvelope {
    #[serde(default)]
    success: bool,
    error: Option<String>,
}

/// コメントサーバーの REST 契約
#[async_trait]
pub trait CommentsApi: Send + Sync {
    /// Fetch the whole forest. The server does not paginate.
    async fn fetch_comments(&self) -> Result<Vec<CommentNode>, CommentError>;

    /// Create a comment or reply, returning the new comment's id when the server reports one.
    async fn add_comment(&self, new_comment: &NewComment) -> Result<Option<CommentId>, CommentError>;

    async fn delete_comment(&self, id: &CommentId) -> Result<(), CommentError>;
}

/// HTTP 実装
#[derive(Debug, Clone)]
pub struct HttpCommentsApi {
    client: ApiClient,
}

impl HttpCommentsApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CommentsApi for HttpCommentsApi {
    async fn fetch_comments(&self) -> Result<Vec<CommentNode>, CommentError> {
        let envelope: CommentsEnvelope = self.client.get_json(&["api", "comments"]).await?;
        if envelope.success {
            Ok(envelope.comments)
        } else {
            Err(CommentError::Server(envelope.error))
        }
    }

    async fn add_comment(&self, new_comment: &NewComment) -> Result<Option<CommentId>, CommentError> {
        let envelope: AddCommentEnvelope = self
            .client
            .post_json(&["api", "comments", "add"], new_comment)
            .await?;
        if envelope.success {
            Ok(envelope.comment.map(|created| created.id))
        } else {
            Err(CommentError::Server(envelope.error))
        }
    }

    async fn delete_comment(&self, id: &CommentId) -> Result<(), CommentError> {
        let envelope: StatusEnvelope = self
            .client
            .delete_json(&["api", "comments", "delete", id.as_str()])
            .await?;
        if envelope.success {
            Ok(())
        } else {
            Err(CommentError::Server(envelope.error))
        }
    }
}
