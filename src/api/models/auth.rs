//! API request/response models for authentication.

use crate::api::models::users::UserResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful registration/login: the user view plus the raw token value.
/// The token is shown to the client exactly once, here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub user: UserResponse,
    pub access_token: String,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct LogoutQuery {
    /// When true, revoke every access token of the requester, not just the
    /// presented one
    pub all: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LogoutResponse {
    /// False only when the store could not execute the delete
    pub success: bool,
    /// Number of tokens actually revoked; logging out an already-invalid
    /// token succeeds with 0
    pub revoked: u64,
}
