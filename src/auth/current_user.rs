//! Extractor resolving the authenticated user from the `Authorization` header.

use crate::{
    api::models::users::CurrentUser,
    db::{
        errors::DbError,
        handlers::Users,
        models::session_tokens::ACCESS_CONTEXT,
    },
    errors::{Error, Result},
    AppState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// Resolve the bearer of the raw `Authorization` header value.
    ///
    /// The header value is the opaque token itself; it has no internal
    /// structure to parse. Missing header and unresolvable token are
    /// deliberately distinct failures: the first is "no credential" (401),
    /// the second "credential present but invalid" (403).
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .ok_or(Error::Unauthenticated { message: None })?;

        let raw_token = auth_header
            .to_str()
            .map_err(|e| Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            })?
            .trim();

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(DbError::from(e)))?;
        let mut users = Users::new(&mut conn);

        match users.find_by_token(raw_token, ACCESS_CONTEXT).await? {
            Some(user) => {
                debug!("Resolved session for user {}", user.id);
                Ok(CurrentUser::from(user))
            }
            None => {
                trace!("Authorization header present but token did not resolve");
                Err(Error::Forbidden {
                    message: Some("Invalid session token".to_string()),
                })
            }
        }
    }
}
