//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//!
//! # API Structure
//!
//! - **Authentication** (`/auth/*`): Registration, login, logout
//! - **Users** (`/users/*`): Profiles, feed, follower listings, follow edges
//! - **Posts** (`/posts/*`): Posts and their comments
//! - **Comments** (`/comments/*`): Comment deletion
//!
//! All endpoints are documented with OpenAPI annotations using `utoipa`;
//! the rendered documentation is served at `/docs`.

pub mod handlers;
pub mod models;
