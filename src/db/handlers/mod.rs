//! Repository implementations for database access.
//!
//! Each repository:
//! - Wraps a SQLx connection or transaction
//! - Provides strongly-typed CRUD operations
//! - Handles query construction and parameter binding
//! - Returns domain models from [`crate::db::models`]
//!
//! # Available Repositories
//!
//! - [`Users`]: User accounts, credential lookups, and token-based identity
//!   resolution
//! - [`SessionTokens`]: Opaque session token lifecycle
//! - [`Posts`]: Posts with embedded author data and the follow feed
//! - [`Comments`]: Comments attached to posts
//! - [`Follows`]: Follower/followee edges

pub mod comments;
pub mod follows;
pub mod posts;
pub mod repository;
pub mod session_tokens;
pub mod users;

pub use comments::Comments;
pub use follows::Follows;
pub use posts::Posts;
pub use repository::Repository;
pub use session_tokens::SessionTokens;
pub use users::Users;
