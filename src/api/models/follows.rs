//! API request/response models for follow edges.

use crate::db::models::follows::FollowUserDBResponse;
use crate::types::UserId;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A user as listed among followers/followees.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FollowUserResponse {
    #[schema(value_type = String, format = "uuid")]
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<FollowUserDBResponse> for FollowUserResponse {
    fn from(db: FollowUserDBResponse) -> Self {
        Self {
            id: db.id,
            username: db.username,
            email: db.email,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct FollowActionResponse {
    /// For follow: whether a new edge was created (false when already
    /// following). For unfollow: whether an edge was removed.
    pub success: bool,
}
