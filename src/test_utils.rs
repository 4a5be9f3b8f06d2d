//! Shared helpers for tests.

use crate::{api::models::auth::AuthResponse, config::Config, AppState};
use axum_test::TestServer;
use sqlx::PgPool;

pub fn create_test_config() -> Config {
    Config::default()
}

pub fn create_test_state(pool: PgPool) -> AppState {
    AppState::builder().db(pool).config(create_test_config()).build()
}

/// A test server running the full application router.
pub fn create_test_server(pool: PgPool) -> TestServer {
    TestServer::new(crate::router(create_test_state(pool))).unwrap()
}

/// Register `{username}@example.com` with password "password1" and return
/// the fresh session.
pub async fn register_test_user(server: &TestServer, username: &str) -> AuthResponse {
    let response = server
        .post("/auth/register")
        .json(&serde_json::json!({
            "email": format!("{username}@example.com"),
            "username": username,
            "password": "password1",
        }))
        .await;
    response.assert_status(axum::http::StatusCode::CREATED);
    response.json()
}
