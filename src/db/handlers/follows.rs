//! Database repository for follow edges.

use crate::db::{
    errors::{DbError, Result},
    models::follows::FollowUserDBResponse,
};
use crate::types::{abbrev_uuid, UserId};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
struct FollowUser {
    pub id: UserId,
    pub username: String,
    pub email: String,
}

impl From<FollowUser> for FollowUserDBResponse {
    fn from(user: FollowUser) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
        }
    }
}

pub struct Follows<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Follows<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Create a follow edge. Returns `false` when the edge already exists
    /// (the pair carries a unique constraint); any other failure propagates.
    #[instrument(skip(self), fields(follower = %abbrev_uuid(&follower_id), followee = %abbrev_uuid(&followee_id)), err)]
    pub async fn follow(&mut self, follower_id: UserId, followee_id: UserId) -> Result<bool> {
        let id = Uuid::new_v4();

        let result = sqlx::query("INSERT INTO follows (id, follower_id, followee_id) VALUES ($1, $2, $3)")
            .bind(id)
            .bind(follower_id)
            .bind(followee_id)
            .execute(&mut *self.db)
            .await;

        match result.map_err(DbError::from) {
            Ok(_) => Ok(true),
            Err(DbError::UniqueViolation { .. }) => Ok(false),
            Err(other) => Err(other),
        }
    }

    /// Remove a follow edge. Returns `false` when no edge matched.
    #[instrument(skip(self), fields(follower = %abbrev_uuid(&follower_id), followee = %abbrev_uuid(&followee_id)), err)]
    pub async fn unfollow(&mut self, follower_id: UserId, followee_id: UserId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2")
            .bind(follower_id)
            .bind(followee_id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Users following the given user.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn followers(&mut self, user_id: UserId) -> Result<Vec<FollowUserDBResponse>> {
        let users = sqlx::query_as::<_, FollowUser>(
            r#"
            SELECT u.id, u.username, u.email
            FROM users u
            INNER JOIN follows f ON u.id = f.follower_id
            WHERE f.followee_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users.into_iter().map(FollowUserDBResponse::from).collect())
    }

    /// Users the given user follows.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn followees(&mut self, user_id: UserId) -> Result<Vec<FollowUserDBResponse>> {
        let users = sqlx::query_as::<_, FollowUser>(
            r#"
            SELECT u.id, u.username, u.email
            FROM users u
            INNER JOIN follows f ON u.id = f.followee_id
            WHERE f.follower_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(users.into_iter().map(FollowUserDBResponse::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Repository, Users};
    use crate::db::models::users::UserCreateDBRequest;
    use sqlx::PgPool;

    async fn create_user(pool: &PgPool, username: &str) -> UserId {
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        users
            .create(&UserCreateDBRequest {
                username: username.to_string(),
                email: format!("{username}@example.com"),
                password_hash: "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHQ$hash".to_string(),
            })
            .await
            .unwrap()
            .id
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_follow_and_listings(pool: PgPool) {
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut follows = Follows::new(&mut conn);

        assert!(follows.follow(alice, bob).await.unwrap());

        let bobs_followers = follows.followers(bob).await.unwrap();
        assert_eq!(bobs_followers.len(), 1);
        assert_eq!(bobs_followers[0].username, "alice");

        let alices_followees = follows.followees(alice).await.unwrap();
        assert_eq!(alices_followees.len(), 1);
        assert_eq!(alices_followees[0].username, "bob");

        // The reverse direction is empty
        assert!(follows.followers(alice).await.unwrap().is_empty());
        assert!(follows.followees(bob).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_duplicate_follow_reports_false(pool: PgPool) {
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut follows = Follows::new(&mut conn);

        assert!(follows.follow(alice, bob).await.unwrap());
        assert!(!follows.follow(alice, bob).await.unwrap());
        assert_eq!(follows.followers(bob).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unfollow(pool: PgPool) {
        let alice = create_user(&pool, "alice").await;
        let bob = create_user(&pool, "bob").await;

        let mut conn = pool.acquire().await.unwrap();
        let mut follows = Follows::new(&mut conn);

        assert!(follows.follow(alice, bob).await.unwrap());
        assert!(follows.unfollow(alice, bob).await.unwrap());
        assert!(!follows.unfollow(alice, bob).await.unwrap());
        assert!(follows.followers(bob).await.unwrap().is_empty());
    }
}
