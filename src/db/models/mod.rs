//! Database record structures matching table schemas.

pub mod comments;
pub mod follows;
pub mod posts;
pub mod session_tokens;
pub mod users;
