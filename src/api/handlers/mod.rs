//! Axum route handlers for all API endpoints.

pub mod auth;
pub mod comments;
pub mod follows;
pub mod posts;
pub mod users;
