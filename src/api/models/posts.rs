//! API request/response models for posts.

use super::pagination::Pagination;
use crate::db::models::posts::PostDBResponse;
use crate::types::{PostId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostCreate {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
}

/// A post's author as embedded in post responses.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostAuthor {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PostResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user: PostAuthor,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<PostDBResponse> for PostResponse {
    fn from(db: PostDBResponse) -> Self {
        Self {
            id: db.id,
            title: db.title,
            content: db.content,
            user: PostAuthor {
                id: db.user_id,
                username: db.author_username,
            },
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

/// Query parameters for listing posts
#[derive(Debug, Deserialize, IntoParams, ToSchema)]
pub struct ListPostsQuery {
    /// Pagination parameters
    #[serde(flatten)]
    #[param(inline)]
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeletePostResponse {
    pub success: bool,
}
