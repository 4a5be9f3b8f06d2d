//! Database models for posts.

use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};

/// Database request for creating a post
#[derive(Debug, Clone)]
pub struct PostCreateDBRequest {
    pub user_id: UserId,
    pub title: String,
    pub content: String,
}

/// Database request for updating a post
#[derive(Debug, Clone, Default)]
pub struct PostUpdateDBRequest {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// Database response for a post, author embedded
#[derive(Debug, Clone)]
pub struct PostDBResponse {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
