//! # ripple: a social platform backend
//!
//! `ripple` is a REST backend for a small social platform: users write
//! posts, comment on them, and follow each other. It is built on
//! [Axum](https://github.com/tokio-rs/axum) with PostgreSQL for all
//! persistence.
//!
//! ## Authentication model
//!
//! Sessions are **opaque tokens**. Registration and login mint a random
//! value (48 bytes from the OS CSPRNG, base64-rendered), store it in the
//! `user_tokens` table, and return the raw value to the client, which
//! presents it in the `Authorization` header on subsequent requests. A token
//! is valid exactly while its row exists: logout is a row delete,
//! logout-from-all-devices deletes every access token of the owner, and
//! deleting an account cascades its tokens away. No token carries decodable
//! structure, so there is nothing for a client to parse or forge.
//!
//! Passwords are hashed with Argon2id; login failures for an unknown email
//! and a wrong password are deliberately indistinguishable to resist user
//! enumeration.
//!
//! ### Request flow
//!
//! Inbound requests pass the `Authorization` header value to the
//! [`api::models::users::CurrentUser`] extractor, which joins the token
//! store against the user table. A missing header rejects with 401 (no
//! credential); a present-but-unresolvable token rejects with 403 (invalid
//! credential). Mutation routes for posts, comments, and profiles are
//! additionally wrapped by ownership guards in [`auth::middleware`] that
//! load the target resource and compare its author against the resolved
//! identity.
//!
//! Every multi-statement flow (registration, login, profile update) runs
//! inside a single transaction; a failure on any step rolls the whole flow
//! back, so a user without their first token or a token without its user is
//! never observable.
//!
//! ## Core components
//!
//! The **API layer** ([`api`]) contains route handlers and request/response
//! models. The **authentication layer** ([`auth`]) holds password hashing,
//! token generation, the transactional auth flows, and the guards. The
//! **database layer** ([`db`]) uses the repository pattern: each entity has
//! a repository wrapping a `PgConnection` that encapsulates its queries.
//!
//! ## Quick start
//!
//! ```no_run
//! use clap::Parser;
//! use ripple::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let args = ripple::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     ripple::telemetry::init_telemetry()?;
//!
//!     let app = Application::new(config).await?;
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     })
//!     .await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database setup
//!
//! The application requires PostgreSQL and runs migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::migrate::MigrateError> {
//! ripple::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
mod openapi;
pub mod telemetry;
mod types;

#[cfg(test)]
pub mod test_utils;

use crate::openapi::ApiDoc;
use axum::{
    middleware::from_fn_with_state,
    routing::{delete, get, patch, post},
    Router,
};
use bon::Builder;
pub use config::Config;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::future::Future;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{CommentId, PostId, TokenId, UserId};

/// Application state shared across all request handlers.
#[derive(Clone, Builder)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
}

/// Get the ripple database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Build the application router with all endpoints and middleware.
///
/// Ownership guards are attached as route layers on mutation routes;
/// authentication itself happens in the `CurrentUser` extractor, either
/// directly in a handler's signature or as the first stage of a guard.
pub fn router(state: AppState) -> Router {
    Router::new()
        // Authentication
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/logout", delete(api::handlers::auth::logout))
        // Users
        .route("/users", get(api::handlers::users::list_users))
        .route("/users/me", get(api::handlers::users::me))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route(
            "/users/{id}",
            patch(api::handlers::users::update_user)
                .delete(api::handlers::users::delete_user)
                .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_profile_owner)),
        )
        .route(
            "/users/{id}/feed",
            get(api::handlers::users::feed).route_layer(from_fn_with_state(state.clone(), auth::middleware::require_profile_owner)),
        )
        // Follows
        .route("/users/{id}/followers", get(api::handlers::follows::list_followers))
        .route("/users/{id}/followees", get(api::handlers::follows::list_followees))
        .route(
            "/users/{id}/follow",
            post(api::handlers::follows::follow).delete(api::handlers::follows::unfollow),
        )
        // Posts
        .route("/posts", get(api::handlers::posts::list_posts))
        .route("/posts", post(api::handlers::posts::create_post))
        .route("/posts/{id}", get(api::handlers::posts::get_post))
        .route(
            "/posts/{id}",
            patch(api::handlers::posts::update_post)
                .delete(api::handlers::posts::delete_post)
                .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_post_owner)),
        )
        // Comments
        .route("/posts/{id}/comments", get(api::handlers::comments::list_post_comments))
        .route("/posts/{id}/comments", post(api::handlers::comments::create_comment))
        .route(
            "/comments/{id}",
            delete(api::handlers::comments::delete_comment)
                .route_layer(from_fn_with_state(state.clone(), auth::middleware::require_comment_owner)),
        )
        // API documentation
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// The running application: a connected pool, applied migrations, and a
/// bound listener.
pub struct Application {
    state: AppState,
    listener: TcpListener,
}

impl Application {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.pool.max_connections)
            .connect(&config.database_url)
            .await?;

        migrator().run(&pool).await?;

        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        info!("Listening on {}", listener.local_addr()?);

        let state = AppState::builder().db(pool).config(config).build();

        Ok(Self { state, listener })
    }

    /// Serve until the shutdown future resolves.
    pub async fn serve(self, shutdown: impl Future<Output = ()> + Send + 'static) -> anyhow::Result<()> {
        let app = router(self.state);

        axum::serve(self.listener, app).with_graceful_shutdown(shutdown).await?;

        Ok(())
    }
}
