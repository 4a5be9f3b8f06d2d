//! Database repository for comments.

use crate::db::{
    errors::Result,
    models::comments::{CommentCreateDBRequest, CommentDBResponse},
};
use crate::types::{abbrev_uuid, CommentId, PostId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct Comment {
    pub id: CommentId,
    pub content: String,
    pub post_id: PostId,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Comment> for CommentDBResponse {
    fn from(comment: Comment) -> Self {
        Self {
            id: comment.id,
            content: comment.content,
            post_id: comment.post_id,
            user_id: comment.user_id,
            created_at: comment.created_at,
            updated_at: comment.updated_at,
        }
    }
}

pub struct Comments<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Comments<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    #[instrument(skip(self, request), fields(post_id = %abbrev_uuid(&request.post_id)), err)]
    pub async fn create(&mut self, request: &CommentCreateDBRequest) -> Result<CommentDBResponse> {
        let comment_id = Uuid::new_v4();

        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (id, content, post_id, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, content, post_id, user_id, created_at, updated_at
            "#,
        )
        .bind(comment_id)
        .bind(&request.content)
        .bind(request.post_id)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(CommentDBResponse::from(comment))
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: CommentId) -> Result<Option<CommentDBResponse>> {
        let comment =
            sqlx::query_as::<_, Comment>("SELECT id, content, post_id, user_id, created_at, updated_at FROM comments WHERE id = $1")
                .bind(id)
                .fetch_optional(&mut *self.db)
                .await?;

        Ok(comment.map(CommentDBResponse::from))
    }

    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&post_id)), err)]
    pub async fn list_for_post(&mut self, post_id: PostId) -> Result<Vec<CommentDBResponse>> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT id, content, post_id, user_id, created_at, updated_at FROM comments WHERE post_id = $1 ORDER BY created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(comments.into_iter().map(CommentDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(comment_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: CommentId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }
}
