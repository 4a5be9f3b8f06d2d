//! Database repository for posts.

use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::posts::{PostCreateDBRequest, PostDBResponse, PostUpdateDBRequest},
};
use crate::types::{abbrev_uuid, PostId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing posts
#[derive(Debug, Clone)]
pub struct PostFilter {
    pub skip: i64,
    pub limit: i64,
}

impl PostFilter {
    pub fn new(skip: i64, limit: i64) -> Self {
        Self { skip, limit }
    }
}

// Database entity model joined with the author row
#[derive(Debug, Clone, FromRow)]
struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub user_id: UserId,
    pub author_username: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Post> for PostDBResponse {
    fn from(post: Post) -> Self {
        Self {
            id: post.id,
            title: post.title,
            content: post.content,
            user_id: post.user_id,
            author_username: post.author_username,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

const POST_WITH_AUTHOR: &str = r#"
    SELECT p.id, p.title, p.content, p.user_id, u.username AS author_username, p.created_at, p.updated_at
    FROM posts p
    INNER JOIN users u ON u.id = p.user_id
"#;

pub struct Posts<'c> {
    db: &'c mut PgConnection,
}

#[async_trait::async_trait]
impl<'c> Repository for Posts<'c> {
    type CreateRequest = PostCreateDBRequest;
    type UpdateRequest = PostUpdateDBRequest;
    type Response = PostDBResponse;
    type Id = PostId;
    type Filter = PostFilter;

    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id)), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let post_id = Uuid::new_v4();

        sqlx::query("INSERT INTO posts (id, title, content, user_id) VALUES ($1, $2, $3, $4)")
            .bind(post_id)
            .bind(&request.title)
            .bind(&request.content)
            .bind(request.user_id)
            .execute(&mut *self.db)
            .await?;

        // Re-read through the author join so the response shape is uniform
        let post = sqlx::query_as::<_, Post>(&format!("{POST_WITH_AUTHOR} WHERE p.id = $1"))
            .bind(post_id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(PostDBResponse::from(post))
    }

    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let post = sqlx::query_as::<_, Post>(&format!("{POST_WITH_AUTHOR} WHERE p.id = $1"))
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(post.map(PostDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(limit = filter.limit, skip = filter.skip), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let posts = sqlx::query_as::<_, Post>(&format!("{POST_WITH_AUTHOR} ORDER BY p.created_at DESC LIMIT $1 OFFSET $2"))
            .bind(filter.limit)
            .bind(filter.skip)
            .fetch_all(&mut *self.db)
            .await?;

        Ok(posts.into_iter().map(PostDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1").bind(id).execute(&mut *self.db).await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(post_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        let updated = sqlx::query(
            r#"
            UPDATE posts SET
                title = COALESCE($2, title),
                content = COALESCE($3, content),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&request.title)
        .bind(&request.content)
        .execute(&mut *self.db)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::NotFound);
        }

        let post = sqlx::query_as::<_, Post>(&format!("{POST_WITH_AUTHOR} WHERE p.id = $1"))
            .bind(id)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(PostDBResponse::from(post))
    }
}

impl<'c> Posts<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Posts authored by users the given user follows, newest first.
    #[instrument(skip(self, filter), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_feed(&mut self, user_id: UserId, filter: &PostFilter) -> Result<Vec<PostDBResponse>> {
        let posts = sqlx::query_as::<_, Post>(&format!(
            r#"{POST_WITH_AUTHOR}
            INNER JOIN follows f ON f.followee_id = p.user_id
            WHERE f.follower_id = $1
            ORDER BY p.created_at DESC LIMIT $2 OFFSET $3"#
        ))
        .bind(user_id)
        .bind(filter.limit)
        .bind(filter.skip)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(posts.into_iter().map(PostDBResponse::from).collect())
    }
}
