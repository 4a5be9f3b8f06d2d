use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    api::models::{
        follows::{FollowActionResponse, FollowUserResponse},
        users::CurrentUser,
    },
    db::handlers::Follows,
    errors::Error,
    types::UserId,
    AppState,
};

/// List users following the given user
#[utoipa::path(
    get,
    path = "/users/{id}/followers",
    tag = "follows",
    responses(
        (status = 200, description = "Followers", body = Vec<FollowUserResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_followers(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<Vec<FollowUserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut follows = Follows::new(&mut conn);

    let followers = follows.followers(id).await?;
    Ok(Json(followers.into_iter().map(FollowUserResponse::from).collect()))
}

/// List users the given user follows
#[utoipa::path(
    get,
    path = "/users/{id}/followees",
    tag = "follows",
    responses(
        (status = 200, description = "Followees", body = Vec<FollowUserResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_followees(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<Vec<FollowUserResponse>>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut follows = Follows::new(&mut conn);

    let followees = follows.followees(id).await?;
    Ok(Json(followees.into_iter().map(FollowUserResponse::from).collect()))
}

/// Follow the given user as the authenticated user
#[utoipa::path(
    post,
    path = "/users/{id}/follow",
    tag = "follows",
    responses(
        (status = 200, description = "Follow result", body = FollowActionResponse),
        (status = 400, description = "Followee does not exist"),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn follow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<FollowActionResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut follows = Follows::new(&mut conn);

    let success = follows.follow(current_user.id, id).await?;
    Ok(Json(FollowActionResponse { success }))
}

/// Unfollow the given user
#[utoipa::path(
    delete,
    path = "/users/{id}/follow",
    tag = "follows",
    responses(
        (status = 200, description = "Unfollow result", body = FollowActionResponse),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn unfollow(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<FollowActionResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut follows = Follows::new(&mut conn);

    let success = follows.unfollow(current_user.id, id).await?;
    Ok(Json(FollowActionResponse { success }))
}
