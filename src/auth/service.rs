//! Transactional authentication flows.
//!
//! Each flow is one transaction. Transactions are scoped resources: sqlx
//! rolls back a dropped transaction, so every early-return path (`?`) leaves
//! the store untouched and no flow can commit a user without their token or
//! a token without its user.

use sqlx::PgPool;
use tracing::instrument;

use crate::{
    auth::{password, token},
    db::{
        errors::DbError,
        handlers::{Repository, SessionTokens, Users},
        models::{
            session_tokens::{SessionTokenCreateDBRequest, ACCESS_CONTEXT},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    errors::{Error, Result},
};

/// Registration input for [`register`].
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub username: String,
    pub password: String,
}

/// Login input for [`login`].
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// A freshly authenticated session: the user record and the raw token value.
///
/// The token value exists in raw form only here and in the client's hands;
/// the store keeps it as an opaque lookup key.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserDBResponse,
    pub token: String,
}

const CONFLICT_MESSAGE: &str = "Email or username not available";

/// Translate a storage error from a token insert. A unique violation here
/// means the generator produced a duplicate value, which is an integrity
/// failure, never retried.
fn classify_token_insert_error(err: DbError) -> Error {
    match err {
        DbError::UniqueViolation { .. } => Error::Internal {
            operation: "mint session token: generator produced a duplicate value".to_string(),
        },
        other => Error::Database(other),
    }
}

/// Register a new account and mint its first access token.
///
/// The email/username pre-check is an optimization; the storage unique
/// constraints remain the authority, so a concurrent duplicate insert lands
/// on the same conflict error instead of surfacing as a storage failure.
#[instrument(skip_all, fields(username = %input.username), err)]
pub async fn register(db: &PgPool, input: Registration) -> Result<AuthSession> {
    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let existing = {
        let mut users = Users::new(&mut tx);
        users.find_by_email_or_username(&input.email, &input.username).await?
    };
    if existing.is_some() {
        return Err(Error::Conflict {
            message: CONFLICT_MESSAGE.to_string(),
        });
    }

    // Hash on a blocking thread to avoid stalling the async runtime
    let password = input.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    let user = {
        let mut users = Users::new(&mut tx);
        users
            .create(&UserCreateDBRequest {
                username: input.username,
                email: input.email,
                password_hash,
            })
            .await
            .map_err(|e| match e {
                DbError::UniqueViolation { .. } => Error::Conflict {
                    message: CONFLICT_MESSAGE.to_string(),
                },
                other => Error::Database(other),
            })?
    };

    let value = token::generate_token();
    {
        let mut tokens = SessionTokens::new(&mut tx);
        tokens
            .create(&SessionTokenCreateDBRequest {
                user_id: user.id,
                value: value.clone(),
                context: ACCESS_CONTEXT.to_string(),
            })
            .await
            .map_err(classify_token_insert_error)?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(AuthSession { user, token: value })
}

/// Verify credentials and mint an additional access token.
///
/// Unknown email and wrong password produce the identical error. Prior
/// tokens stay valid; a user may hold several concurrent sessions.
#[instrument(skip_all, err)]
pub async fn login(db: &PgPool, input: Credentials) -> Result<AuthSession> {
    let mut tx = db.begin().await.map_err(|e| Error::Database(e.into()))?;

    let user = {
        let mut users = Users::new(&mut tx);
        users.get_user_by_email(&input.email).await?
    }
    .ok_or(Error::InvalidCredentials)?;

    // Verify on a blocking thread to avoid stalling the async runtime
    let password = input.password.clone();
    let digest = user.password_hash.clone();
    let is_valid = tokio::task::spawn_blocking(move || password::verify_password(&password, &digest))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password verification task: {e}"),
        })??;

    if !is_valid {
        return Err(Error::InvalidCredentials);
    }

    let value = token::generate_token();
    {
        let mut tokens = SessionTokens::new(&mut tx);
        tokens
            .create(&SessionTokenCreateDBRequest {
                user_id: user.id,
                value: value.clone(),
                context: ACCESS_CONTEXT.to_string(),
            })
            .await
            .map_err(classify_token_insert_error)?;
    }

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    Ok(AuthSession { user, token: value })
}

/// Invalidate the presented token. Returns the number of rows removed;
/// removing an already-invalid token is success with 0, a storage failure
/// is an error the caller can tell apart.
#[instrument(skip_all, err)]
pub async fn logout(db: &PgPool, raw_token: &str) -> Result<u64> {
    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tokens = SessionTokens::new(&mut conn);

    Ok(tokens.delete_by_value(raw_token, ACCESS_CONTEXT).await?)
}

/// Invalidate every access token of the user the presented token resolves
/// to. A token that resolves to nobody removes zero rows and still succeeds.
#[instrument(skip_all, err)]
pub async fn logout_from_all_devices(db: &PgPool, raw_token: &str) -> Result<u64> {
    let mut conn = db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut tokens = SessionTokens::new(&mut conn);

    Ok(tokens.delete_all_for_owner(raw_token, ACCESS_CONTEXT).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::PgPool;

    fn registration(username: &str, email: &str) -> Registration {
        Registration {
            email: email.to_string(),
            username: username.to_string(),
            password: "password1".to_string(),
        }
    }

    async fn user_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM users").fetch_one(pool).await.unwrap()
    }

    async fn token_count(pool: &PgPool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM user_tokens").fetch_one(pool).await.unwrap()
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_issues_resolvable_token(pool: PgPool) {
        let session = register(&pool, registration("a", "a@a.com")).await.unwrap();

        assert_eq!(session.user.email, "a@a.com");
        assert!(!session.token.is_empty());

        // The stored digest is not the plaintext but verifies against it
        assert_ne!(session.user.password_hash, "password1");
        assert!(password::verify_password("password1", &session.user.password_hash).unwrap());

        // The returned token resolves straight back to the same user
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        let resolved = users.find_by_token(&session.token, ACCESS_CONTEXT).await.unwrap().unwrap();
        assert_eq!(resolved.id, session.user.id);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_email_leaves_no_rows(pool: PgPool) {
        register(&pool, registration("first", "taken@example.com")).await.unwrap();

        // Same email, different username
        let err = register(&pool, registration("second", "taken@example.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));

        // The failed registration created neither a user nor a token
        assert_eq!(user_count(&pool).await, 1);
        assert_eq!(token_count(&pool).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_register_duplicate_username_conflicts(pool: PgPool) {
        register(&pool, registration("sameuser", "one@example.com")).await.unwrap();

        let err = register(&pool, registration("sameuser", "two@example.com")).await.unwrap_err();
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(user_count(&pool).await, 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_mints_additional_token(pool: PgPool) {
        let first = register(&pool, registration("multi", "multi@example.com")).await.unwrap();

        let second = login(
            &pool,
            Credentials {
                email: "multi@example.com".to_string(),
                password: "password1".to_string(),
            },
        )
        .await
        .unwrap();

        // Always a previously-unseen token
        assert_ne!(first.token, second.token);

        // Both sessions resolve: multi-session is permitted
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert!(users.find_by_token(&first.token, ACCESS_CONTEXT).await.unwrap().is_some());
        assert!(users.find_by_token(&second.token, ACCESS_CONTEXT).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_login_failures_are_indistinguishable(pool: PgPool) {
        register(&pool, registration("known", "known@example.com")).await.unwrap();

        let wrong_password = login(
            &pool,
            Credentials {
                email: "known@example.com".to_string(),
                password: "not-the-password".to_string(),
            },
        )
        .await
        .unwrap_err();

        let unknown_email = login(
            &pool,
            Credentials {
                email: "unknown@example.com".to_string(),
                password: "password1".to_string(),
            },
        )
        .await
        .unwrap_err();

        assert!(matches!(wrong_password, Error::InvalidCredentials));
        assert!(matches!(unknown_email, Error::InvalidCredentials));
        // Identical externally observable shape
        assert_eq!(wrong_password.user_message(), unknown_email.user_message());
        assert_eq!(wrong_password.status_code(), unknown_email.status_code());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_deletes_exactly_the_target(pool: PgPool) {
        let session_a = register(&pool, registration("logout", "logout@example.com")).await.unwrap();
        let session_b = login(
            &pool,
            Credentials {
                email: "logout@example.com".to_string(),
                password: "password1".to_string(),
            },
        )
        .await
        .unwrap();

        assert_eq!(logout(&pool, &session_a.token).await.unwrap(), 1);

        // Second logout with the same token still succeeds, zero rows matched
        assert_eq!(logout(&pool, &session_a.token).await.unwrap(), 0);

        // The other session is untouched
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert!(users.find_by_token(&session_a.token, ACCESS_CONTEXT).await.unwrap().is_none());
        assert!(users.find_by_token(&session_b.token, ACCESS_CONTEXT).await.unwrap().is_some());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_logout_from_all_devices(pool: PgPool) {
        let mine_a = register(&pool, registration("mine", "mine@example.com")).await.unwrap();
        let mine_b = login(
            &pool,
            Credentials {
                email: "mine@example.com".to_string(),
                password: "password1".to_string(),
            },
        )
        .await
        .unwrap();
        let theirs = register(&pool, registration("theirs", "theirs@example.com")).await.unwrap();

        assert_eq!(logout_from_all_devices(&pool, &mine_a.token).await.unwrap(), 2);

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert!(users.find_by_token(&mine_a.token, ACCESS_CONTEXT).await.unwrap().is_none());
        assert!(users.find_by_token(&mine_b.token, ACCESS_CONTEXT).await.unwrap().is_none());
        // Other users' tokens survive
        assert!(users.find_by_token(&theirs.token, ACCESS_CONTEXT).await.unwrap().is_some());

        // Unresolvable token: zero rows, still success
        assert_eq!(logout_from_all_devices(&pool, &mine_a.token).await.unwrap(), 0);
    }
}
