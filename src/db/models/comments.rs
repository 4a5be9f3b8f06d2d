//! Database models for comments.

use crate::types::{CommentId, PostId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a comment
#[derive(Debug, Clone)]
pub struct CommentCreateDBRequest {
    pub user_id: UserId,
    pub post_id: PostId,
    pub content: String,
}

/// Database response for a comment
#[derive(Debug, Clone)]
pub struct CommentDBResponse {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
