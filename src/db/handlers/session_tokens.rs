//! Database repository for session tokens.
//!
//! A token is valid exactly while its row exists; there is no expiry column.
//! Deletes are idempotent: removing a value that no longer exists reports
//! zero affected rows rather than an error.

use crate::db::errors::Result;
use crate::db::models::session_tokens::{SessionTokenCreateDBRequest, SessionTokenDBResponse};
use crate::types::{abbrev_uuid, TokenId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct SessionToken {
    pub id: TokenId,
    pub value: String,
    pub context: String,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
}

impl From<SessionToken> for SessionTokenDBResponse {
    fn from(token: SessionToken) -> Self {
        Self {
            id: token.id,
            value: token.value,
            context: token.context,
            user_id: token.user_id,
            created_at: token.created_at,
        }
    }
}

pub struct SessionTokens<'c> {
    db: &'c mut PgConnection,
}

impl<'c> SessionTokens<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert a token row. The `value` column carries a unique constraint;
    /// a violation surfaces as `DbError::UniqueViolation` for the caller to
    /// classify (a colliding generator is an integrity failure upstream).
    #[instrument(skip(self, request), fields(user_id = %abbrev_uuid(&request.user_id), context = %request.context), err)]
    pub async fn create(&mut self, request: &SessionTokenCreateDBRequest) -> Result<SessionTokenDBResponse> {
        let token_id = Uuid::new_v4();

        let token = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO user_tokens (id, value, context, user_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, value, context, user_id, created_at
            "#,
        )
        .bind(token_id)
        .bind(&request.value)
        .bind(&request.context)
        .bind(request.user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(SessionTokenDBResponse::from(token))
    }

    /// Delete the single token matching (value, context). Returns the number
    /// of rows removed (0 or 1).
    #[instrument(skip(self, value), fields(context = context), err)]
    pub async fn delete_by_value(&mut self, value: &str, context: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM user_tokens WHERE value = $1 AND context = $2")
            .bind(value)
            .bind(context)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected())
    }

    /// Delete every token in `context` owned by the user the presented value
    /// resolves to. If the value resolves to nobody the subquery matches
    /// zero rows, which still counts as success.
    #[instrument(skip(self, value), fields(context = context), err)]
    pub async fn delete_all_for_owner(&mut self, value: &str, context: &str) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM user_tokens
            WHERE user_id = (SELECT user_id FROM user_tokens WHERE value = $1)
              AND context = $2
            "#,
        )
        .bind(value)
        .bind(context)
        .execute(&mut *self.db)
        .await?;

        Ok(result.rows_affected())
    }

    /// Count tokens held by a user in the given context.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn count_for_user(&mut self, user_id: UserId, context: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_tokens WHERE user_id = $1 AND context = $2")
            .bind(user_id)
            .bind(context)
            .fetch_one(&mut *self.db)
            .await?;

        Ok(count)
    }
}
