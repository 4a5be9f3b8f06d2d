//! Resource-ownership route guards.
//!
//! Each guard is an axum middleware for routes carrying a resource id path
//! parameter. The extractor arguments run left-to-right, so authentication
//! (the [`CurrentUser`] extractor) always precedes the ownership decision;
//! on success the resolved identity is attached to the request extensions
//! for downstream handlers.
//!
//! Decision ladder, per guard: resource absent -> 404; owner mismatch ->
//! 403; match -> proceed.

use crate::{
    api::models::users::CurrentUser,
    db::{
        errors::DbError,
        handlers::{Comments, Posts, Repository, Users},
    },
    errors::Error,
    types::{CommentId, PostId, UserId},
    AppState,
};
use axum::{
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use tracing::instrument;

/// Guard for `/posts/{id}` mutation routes: only the author may proceed.
#[instrument(skip(state, request, next), fields(post_id = %id, user_id = %current_user.id))]
pub async fn require_post_owner(
    State(state): State<AppState>,
    Path(id): Path<PostId>,
    current_user: CurrentUser,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
    let mut posts = Posts::new(&mut conn);

    let post = posts.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Post".to_string(),
        id: id.to_string(),
    })?;

    if post.user_id != current_user.id {
        return Err(Error::Forbidden {
            message: Some("Only the author may modify this post".to_string()),
        });
    }

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

/// Guard for `/comments/{id}` mutation routes: only the author may proceed.
#[instrument(skip(state, request, next), fields(comment_id = %id, user_id = %current_user.id))]
pub async fn require_comment_owner(
    State(state): State<AppState>,
    Path(id): Path<CommentId>,
    current_user: CurrentUser,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
    let mut comments = Comments::new(&mut conn);

    let comment = comments.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Comment".to_string(),
        id: id.to_string(),
    })?;

    if comment.user_id != current_user.id {
        return Err(Error::Forbidden {
            message: Some("Only the author may modify this comment".to_string()),
        });
    }

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

/// Guard for `/users/{id}` routes: only the account owner may proceed.
#[instrument(skip(state, request, next), fields(target_id = %id, user_id = %current_user.id))]
pub async fn require_profile_owner(
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    current_user: CurrentUser,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
    let mut users = Users::new(&mut conn);

    let target = users.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    if target.id != current_user.id {
        return Err(Error::Forbidden {
            message: Some("Only the account owner may access this".to_string()),
        });
    }

    request.extensions_mut().insert(current_user);
    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::service::{self, AuthSession, Registration};
    use crate::db::models::posts::PostCreateDBRequest;
    use crate::test_utils::create_test_state;
    use axum::{middleware::from_fn_with_state, routing::patch, Router};
    use axum_test::TestServer;
    use sqlx::PgPool;
    use uuid::Uuid;

    async fn handler() -> &'static str {
        "passed"
    }

    async fn register(pool: &PgPool, username: &str) -> AuthSession {
        service::register(
            pool,
            Registration {
                email: format!("{username}@example.com"),
                username: username.to_string(),
                password: "password1".to_string(),
            },
        )
        .await
        .unwrap()
    }

    fn guarded_post_router(state: AppState) -> TestServer {
        let app = Router::new()
            .route(
                "/posts/{id}",
                patch(handler).route_layer(from_fn_with_state(state.clone(), require_post_owner)),
            )
            .with_state(state);
        TestServer::new(app).unwrap()
    }

    async fn create_post(pool: &PgPool, user_id: UserId) -> PostId {
        let mut conn = pool.acquire().await.unwrap();
        let mut posts = Posts::new(&mut conn);
        posts
            .create(&PostCreateDBRequest {
                user_id,
                title: "Guarded".to_string(),
                content: "Content".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_owner_passes(pool: PgPool) {
        let owner = register(&pool, "owner").await;
        let post_id = create_post(&pool, owner.user.id).await;

        let server = guarded_post_router(create_test_state(pool));
        let response = server
            .patch(&format!("/posts/{post_id}"))
            .add_header("authorization", owner.token.as_str())
            .await;

        response.assert_status_ok();
        response.assert_text("passed");
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_non_owner_is_forbidden(pool: PgPool) {
        let owner = register(&pool, "owner").await;
        let intruder = register(&pool, "intruder").await;
        let post_id = create_post(&pool, owner.user.id).await;

        let server = guarded_post_router(create_test_state(pool));
        let response = server
            .patch(&format!("/posts/{post_id}"))
            .add_header("authorization", intruder.token.as_str())
            .await;

        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_missing_resource_is_not_found(pool: PgPool) {
        let someone = register(&pool, "someone").await;

        let server = guarded_post_router(create_test_state(pool));
        let response = server
            .patch(&format!("/posts/{}", Uuid::new_v4()))
            .add_header("authorization", someone.token.as_str())
            .await;

        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_authentication_runs_before_ownership(pool: PgPool) {
        let owner = register(&pool, "owner").await;
        let post_id = create_post(&pool, owner.user.id).await;

        let server = guarded_post_router(create_test_state(pool));

        // No header at all: unauthenticated, not forbidden/not-found
        let response = server.patch(&format!("/posts/{post_id}")).await;
        response.assert_status(axum::http::StatusCode::UNAUTHORIZED);

        // Garbage credential: forbidden before the resource is even considered
        let response = server
            .patch(&format!("/posts/{post_id}"))
            .add_header("authorization", "garbage")
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_profile_guard(pool: PgPool) {
        let me = register(&pool, "me").await;
        let other = register(&pool, "other").await;
        let state = create_test_state(pool);

        let app = Router::new()
            .route(
                "/users/{id}",
                patch(handler).route_layer(from_fn_with_state(state.clone(), require_profile_owner)),
            )
            .with_state(state);
        let server = TestServer::new(app).unwrap();

        let response = server
            .patch(&format!("/users/{}", me.user.id))
            .add_header("authorization", me.token.as_str())
            .await;
        response.assert_status_ok();

        let response = server
            .patch(&format!("/users/{}", other.user.id))
            .add_header("authorization", me.token.as_str())
            .await;
        response.assert_status(axum::http::StatusCode::FORBIDDEN);

        let response = server
            .patch(&format!("/users/{}", Uuid::new_v4()))
            .add_header("authorization", me.token.as_str())
            .await;
        response.assert_status(axum::http::StatusCode::NOT_FOUND);
    }
}
