use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        comments::{CommentCreate, CommentResponse, DeleteCommentResponse},
        users::CurrentUser,
    },
    db::{
        handlers::{Comments, Posts, Repository},
        models::comments::CommentCreateDBRequest,
    },
    errors::Error,
    types::{CommentId, PostId},
    AppState,
};

/// List comments on a post, oldest first
#[utoipa::path(
    get,
    path = "/posts/{id}/comments",
    tag = "comments",
    responses(
        (status = 200, description = "Comments", body = Vec<CommentResponse>),
        (status = 404, description = "Post not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_post_comments(State(state): State<AppState>, Path(id): Path<PostId>) -> Result<Json<Vec<CommentResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    ensure_post_exists(&mut conn, id).await?;

    let mut comments = Comments::new(&mut conn);
    let listed = comments.list_for_post(id).await?;
    Ok(Json(listed.into_iter().map(CommentResponse::from).collect()))
}

/// Comment on a post as the authenticated user
#[utoipa::path(
    post,
    path = "/posts/{id}/comments",
    request_body = CommentCreate,
    tag = "comments",
    responses(
        (status = 201, description = "Created comment", body = CommentResponse),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
        (status = 404, description = "Post not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_comment(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<PostId>,
    Json(request): Json<CommentCreate>,
) -> Result<(StatusCode, Json<CommentResponse>), Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

    ensure_post_exists(&mut conn, id).await?;

    let mut comments = Comments::new(&mut conn);
    let comment = comments
        .create(&CommentCreateDBRequest {
            user_id: current_user.id,
            post_id: id,
            content: request.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(CommentResponse::from(comment))))
}

/// Delete a comment (author only)
#[utoipa::path(
    delete,
    path = "/comments/{id}",
    tag = "comments",
    responses(
        (status = 200, description = "Deletion result", body = DeleteCommentResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Comment not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_comment(State(state): State<AppState>, Path(id): Path<CommentId>) -> Result<Json<DeleteCommentResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut comments = Comments::new(&mut conn);

    let success = comments.delete(id).await?;
    Ok(Json(DeleteCommentResponse { success }))
}

async fn ensure_post_exists(conn: &mut sqlx::PgConnection, id: PostId) -> Result<(), Error> {
    let mut posts = Posts::new(conn);
    posts.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Post".to_string(),
        id: id.to_string(),
    })?;
    Ok(())
}
