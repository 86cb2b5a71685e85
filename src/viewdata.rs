//! # Common View Data
//!
//! Context shared by every rendered page: site title, the signed-in user and a
//! few counters for the navigation bar.

use crate::db::models::User;
use crate::db::Database;
use crate::error::AppResult;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViewData {
    pub site_title: String,

    /// Signed-in user, password removed
    pub user: Option<User>,

    /// Whether the signed-in user has two-factor login enabled
    pub has_second_factor: bool,

    /// Number of non-deleted accounts
    pub active_users: i64,
}

/// Collaborator that builds [`ViewData`] for a request.
#[async_trait]
pub trait ViewDataProvider: Send + Sync {
    async fn get_data(&self, user: Option<&User>) -> AppResult<ViewData>;
}

/// [`ViewDataProvider`] reading its counters from the application database.
pub struct SqliteViewData {
    db: Arc<Database>,
    site_title: String,
}

impl SqliteViewData {
    pub fn new(db: Arc<Database>, site_title: impl Into<String>) -> Self {
        SqliteViewData {
            db,
            site_title: site_title.into(),
        }
    }
}

#[async_trait]
impl ViewDataProvider for SqliteViewData {
    async fn get_data(&self, user: Option<&User>) -> AppResult<ViewData> {
        let pool = self.db.acquire().await?;

        let active_users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE deleted = 0")
            .fetch_one(&pool)
            .await?;

        Ok(ViewData {
            site_title: self.site_title.clone(),
            user: user.cloned().map(User::without_password),
            has_second_factor: user.is_some_and(User::has_second_factor),
            active_users,
        })
    }
}
