//! # User Lookups
//!
//! Gates resolve users through the [`UserStore`] trait so the lookup source is
//! chosen once, in `AppState::new`, rather than inside each gate.

use crate::db::models::User;
use crate::db::Database;
use crate::error::AppResult;
use async_trait::async_trait;
use sqlx::SqlitePool;
use std::sync::Arc;

/// Source of user records for the authentication gates.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// User referenced by a session, deleted or not.
    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>>;

    /// Non-deleted user owning the given API access token.
    async fn find_by_access_token(&self, token: &str) -> AppResult<Option<User>>;
}

/// [`UserStore`] backed by the application's SQLite database.
pub struct SqliteUserStore {
    db: Arc<Database>,
}

impl SqliteUserStore {
    pub fn new(db: Arc<Database>) -> Self {
        SqliteUserStore { db }
    }
}

#[async_trait]
impl UserStore for SqliteUserStore {
    async fn find_by_id(&self, user_id: i64) -> AppResult<Option<User>> {
        let pool = self.db.acquire().await?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, access_token, totp_key, deleted
             FROM users WHERE id = ?",
        )
        .bind(user_id)
        .fetch_optional(&pool)
        .await?;

        Ok(user)
    }

    async fn find_by_access_token(&self, token: &str) -> AppResult<Option<User>> {
        let pool = self.db.acquire().await?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, username, email, password, access_token, totp_key, deleted
             FROM users WHERE access_token = ? AND deleted = 0",
        )
        .bind(token)
        .fetch_optional(&pool)
        .await?;

        Ok(user)
    }
}

/// Insert a user row; used to seed the database in tests.
#[cfg(test)]
pub(crate) async fn insert_user(pool: &SqlitePool, user: &User) -> AppResult<()> {
    sqlx::query(
        "INSERT INTO users (id, username, email, password, access_token, totp_key, deleted)
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id)
    .bind(&user.username)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.access_token)
    .bind(&user.totp_key)
    .bind(user.deleted)
    .execute(pool)
    .await?;

    Ok(())
}
