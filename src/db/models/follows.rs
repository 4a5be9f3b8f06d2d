//! Database models for follow edges.

use crate::types::UserId;

/// A user as seen through a follow relation (follower or followee listing).
#[derive(Debug, Clone)]
pub struct FollowUserDBResponse {
    pub id: UserId,
    pub username: String,
    pub email: String,
}
