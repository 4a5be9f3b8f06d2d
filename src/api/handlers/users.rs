use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::{
    api::models::{
        posts::{ListPostsQuery, PostResponse},
        users::{CurrentUser, DeleteUserResponse, ListUsersQuery, UserResponse, UserUpdate},
    },
    auth::password,
    db::{
        handlers::{users::UserFilter, posts::PostFilter, Posts, Repository, Users},
        models::users::UserUpdateDBRequest,
    },
    errors::Error,
    types::UserId,
    AppState,
};

/// Get the authenticated user
#[utoipa::path(
    get,
    path = "/users/me",
    tag = "users",
    responses(
        (status = 200, description = "The authenticated user", body = CurrentUser),
        (status = 401, description = "Missing credential"),
        (status = 403, description = "Invalid credential"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn me(current_user: CurrentUser) -> Json<CurrentUser> {
    Json(current_user)
}

/// List users
#[utoipa::path(
    get,
    path = "/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = Vec<UserResponse>),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(State(state): State<AppState>, Query(query): Query<ListUsersQuery>) -> Result<Json<Vec<UserResponse>>, Error> {
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let listed = users.list(&UserFilter::new(skip, limit)).await?;
    Ok(Json(listed.into_iter().map(UserResponse::from).collect()))
}

/// Get a user by id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "users",
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<UserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let user = users.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Update the authenticated user's profile.
///
/// Guarded by the profile-ownership middleware; additionally requires
/// re-verification of the current password before anything changes.
#[utoipa::path(
    patch,
    path = "/users/{id}",
    request_body = UserUpdate,
    tag = "users",
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 401, description = "Current password is incorrect"),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email or username already taken"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(request): Json<UserUpdate>,
) -> Result<Json<UserResponse>, Error> {
    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let user = {
        let mut users = Users::new(&mut tx);
        users.get_by_id(id).await?
    }
    .ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    // Re-verify the current password before mutating anything
    let current_password = request.current_password.clone();
    let digest = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&current_password, &digest))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let password_hash = match request.password {
        Some(new_password) => {
            let password_config = &state.config.auth.password;
            if new_password.len() < password_config.min_length {
                return Err(Error::BadRequest {
                    message: format!("Password must be at least {} characters", password_config.min_length),
                });
            }
            if new_password.len() > password_config.max_length {
                return Err(Error::BadRequest {
                    message: format!("Password must be no more than {} characters", password_config.max_length),
                });
            }
            Some(
                tokio::task::spawn_blocking(move || password::hash_password(&new_password))
                    .await
                    .map_err(|e| Error::Internal {
                        operation: format!("spawn password hashing task: {e}"),
                    })??,
            )
        }
        None => None,
    };

    let updated = {
        let mut users = Users::new(&mut tx);
        users
            .update(
                id,
                &UserUpdateDBRequest {
                    username: request.username,
                    email: request.email,
                    password_hash,
                },
            )
            .await?
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(Json(UserResponse::from(updated)))
}

/// Delete the authenticated user's account (cascades session tokens,
/// posts, comments, and follow edges)
#[utoipa::path(
    delete,
    path = "/users/{id}",
    tag = "users",
    responses(
        (status = 200, description = "Deletion result", body = DeleteUserResponse),
        (status = 403, description = "Not the account owner"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn delete_user(State(state): State<AppState>, Path(id): Path<UserId>) -> Result<Json<DeleteUserResponse>, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut users = Users::new(&mut conn);

    let success = users.delete(id).await?;
    Ok(Json(DeleteUserResponse { success }))
}

/// Posts authored by users the authenticated user follows, newest first
#[utoipa::path(
    get,
    path = "/users/{id}/feed",
    tag = "users",
    params(ListPostsQuery),
    responses(
        (status = 200, description = "Feed", body = Vec<PostResponse>),
        (status = 403, description = "Not the account owner"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn feed(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(query): Query<ListPostsQuery>,
) -> Result<Json<Vec<PostResponse>>, Error> {
    let (skip, limit) = query.pagination.params();

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut posts = Posts::new(&mut conn);

    let feed = posts.list_feed(current_user.id, &PostFilter::new(skip, limit)).await?;
    Ok(Json(feed.into_iter().map(PostResponse::from).collect()))
}
