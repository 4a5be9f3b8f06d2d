//! OpenAPI documentation configuration.
//!
//! The rendered document is served at `/docs` by the main router.

use utoipa::OpenApi;

use crate::api::models::{
    auth::{AuthResponse, LoginRequest, LogoutResponse, RegisterRequest},
    comments::{CommentCreate, CommentResponse, DeleteCommentResponse},
    follows::{FollowActionResponse, FollowUserResponse},
    posts::{DeletePostResponse, PostAuthor, PostCreate, PostResponse, PostUpdate},
    users::{CurrentUser, DeleteUserResponse, UserResponse, UserUpdate},
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ripple API",
        description = "Social platform backend with opaque-token authentication"
    ),
    paths(
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::logout,
        crate::api::handlers::users::me,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
        crate::api::handlers::users::feed,
        crate::api::handlers::follows::list_followers,
        crate::api::handlers::follows::list_followees,
        crate::api::handlers::follows::follow,
        crate::api::handlers::follows::unfollow,
        crate::api::handlers::posts::list_posts,
        crate::api::handlers::posts::get_post,
        crate::api::handlers::posts::create_post,
        crate::api::handlers::posts::update_post,
        crate::api::handlers::posts::delete_post,
        crate::api::handlers::comments::list_post_comments,
        crate::api::handlers::comments::create_comment,
        crate::api::handlers::comments::delete_comment,
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        AuthResponse,
        LogoutResponse,
        CurrentUser,
        UserResponse,
        UserUpdate,
        DeleteUserResponse,
        FollowUserResponse,
        FollowActionResponse,
        PostCreate,
        PostUpdate,
        PostAuthor,
        PostResponse,
        DeletePostResponse,
        CommentCreate,
        CommentResponse,
        DeleteCommentResponse,
    )),
    tags(
        (name = "auth", description = "Registration, login, and session revocation"),
        (name = "users", description = "User profiles and feeds"),
        (name = "follows", description = "Follower/followee edges"),
        (name = "posts", description = "Posts"),
        (name = "comments", description = "Comments"),
    )
)]
pub struct ApiDoc;
