//! Database models for session tokens.

use crate::types::{TokenId, UserId};
use chrono::{DateTime, Utc};

/// Context tag for tokens minted by login/registration. The schema permits
/// other contexts (e.g. a future refresh flow) but nothing issues them.
pub const ACCESS_CONTEXT: &str = "access";

/// Database request for inserting a session token
#[derive(Debug, Clone)]
pub struct SessionTokenCreateDBRequest {
    pub user_id: UserId,
    pub value: String,
    pub context: String,
}

/// Database response for a session token
#[derive(Debug, Clone)]
pub struct SessionTokenDBResponse {
    pub id: TokenId,
    pub value: String,
    pub context: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}
