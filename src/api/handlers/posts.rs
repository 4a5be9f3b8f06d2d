use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    api::models::{
        posts::{DeletePostResponse, ListPostsQuery, PostCreate, PostResponse, PostUpdate},
        users::CurrentUser,
    },
    db::{
        handlers::{posts::PostFilter, Posts, Repository},
        models::posts::{PostCreateDBRequest, PostUpdateDBRequest},
    },
    errors::Error,
    types::PostId,
    AppState,
};

/// List posts, newest first
#[utoipa::path(
    get,
    path = "/posts",
    tag = "posts",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Posts", body = Vec<PostResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_posts(State(state): State<AppState>, Query(query): Query<ListPostsQuery>) -> Result<Json<Vec<PostResponse>>, Error> {
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let listed = posts.list(&PostFilter::new(skip, limit)).await?;
    Ok(Json(listed.into_iter().map(PostResponse::from).collect()))
}

/// Get a post by id
#[utoipa::path(
    get,
    path = "/posts/{id}",
    tag = "posts",
    responses(
        (status = 200, description = "The post", body = PostResponse),
        (status = 404, description = "Post not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_post(State(state): State<AppState>, Path(id): Path<PostId>) -> Result<Json<PostResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Post".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(PostResponse::from(post)))
}

/// Create a post authored by the authenticated user
#[utoipa::path(
    post,
    path = "/posts",
    request_body = PostCreate,
    tag = "posts",
    responses(
        (status = 201, description = "Created post", body = PostResponse),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn create_post(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<PostCreate>,
) -> Result<(StatusCode, Json<PostResponse>), Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts
        .create(&PostCreateDBRequest {
            user_id: current_user.id,
            title: request.title,
            content: request.content,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(PostResponse::from(post))))
}

/// Update a post (author only)
#[utoipa::path(
    patch,
    path = "/posts/{id}",
    request_body = PostUpdate,
    tag = "posts",
    responses(
        (status = 200, description = "Updated post", body = PostResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    Json(request): Json<PostUpdate>,
) -> Result<Json<PostResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts
        .update(
            id,
            &PostUpdateDBRequest {
                title: request.title,
                content: request.content,
            },
        )
        .await?;

    Ok(Json(PostResponse::from(post)))
}

/// Delete a post (author only)
#[utoipa::path(
    delete,
    path = "/posts/{id}",
    tag = "posts",
    responses(
        (status = 200, description = "Deletion result", body = DeletePostResponse),
        (status = 403, description = "Not the author"),
        (status = 404, description = "Post not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_post(State(state): State<AppState>, Path(id): Path<PostId>) -> Result<Json<DeletePostResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let success = posts.delete(id).await?;
    Ok(Json(DeletePostResponse { success }))
}
