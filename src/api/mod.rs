mod client;
pub mod comment;
mod error;

pub use client::ApiClient;
pub use comment::{CommentId, CommentNode, CommentsApi, HttpCommentsApi, NewComment};
pub use error::CommentError;
