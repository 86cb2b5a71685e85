//! # Database Module
//!
//! - `models`: Data structures (User)
//! - `users`: User lookups behind the `UserStore` trait
//!
//! This file owns the connection itself. The pool is created lazily by
//! [`Database::init`] and can be re-created at runtime when the database gate
//! finds the connection gone.

pub mod models;
pub mod users;

use crate::error::{AppError, AppResult};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use std::fmt;
use tokio::sync::{Mutex, RwLock};

/// Connection readiness, numbered like document-database drivers report it
/// so log lines stay comparable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Disconnected = 0,
    Connected = 1,
    Connecting = 2,
    Disconnecting = 3,
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReadyState::Disconnected => "disconnected",
            ReadyState::Connected => "connected",
            ReadyState::Connecting => "connecting",
            ReadyState::Disconnecting => "disconnecting",
        };
        write!(f, "{} ({})", name, *self as u8)
    }
}

/// Database handle attached to a request by the database gate.
#[derive(Clone, Debug)]
pub struct DbHandle(pub SqlitePool);

struct Connection {
    state: ReadyState,
    pool: Option<SqlitePool>,
}

/// The application's database: connection settings plus the current pool.
pub struct Database {
    url: String,
    max_connections: u32,
    connection: RwLock<Connection>,
    /// Held for the whole of a connect attempt; at most one runs at a time.
    init_lock: Mutex<()>,
}

impl Database {
    /// Create an unconnected database. Nothing is opened until [`Database::init`].
    pub fn new(url: impl Into<String>, max_connections: u32) -> Self {
        Database {
            url: url.into(),
            max_connections,
            connection: RwLock::new(Connection {
                state: ReadyState::Disconnected,
                pool: None,
            }),
            init_lock: Mutex::new(()),
        }
    }

    /// Current readiness. A pool that was closed underneath us counts as disconnected.
    pub async fn ready_state(&self) -> ReadyState {
        let connection = self.connection.read().await;
        match (&connection.state, &connection.pool) {
            (ReadyState::Connected, Some(pool)) if pool.is_closed() => ReadyState::Disconnected,
            (state, _) => *state,
        }
    }

    /// The pool, if the database is connected.
    pub async fn pool(&self) -> Option<SqlitePool> {
        match self.ready_state().await {
            ReadyState::Connected => self.connection.read().await.pool.clone(),
            _ => None,
        }
    }

    /// Connect (or reconnect) and run pending migrations.
    ///
    /// Returns the existing pool when already connected. Concurrent callers
    /// wait for the attempt in flight and share its pool instead of opening
    /// their own.
    pub async fn init(&self) -> AppResult<SqlitePool> {
        if let Some(pool) = self.pool().await {
            return Ok(pool);
        }

        let _attempt = self.init_lock.lock().await;

        // Another caller may have connected while we waited
        if let Some(pool) = self.pool().await {
            return Ok(pool);
        }

        self.connection.write().await.state = ReadyState::Connecting;

        let result = self.connect().await;

        let mut connection = self.connection.write().await;
        match result {
            Ok(pool) => {
                tracing::info!(url = %self.url, "Database connected");
                connection.state = ReadyState::Connected;
                connection.pool = Some(pool.clone());
                Ok(pool)
            }
            Err(e) => {
                tracing::error!(url = %self.url, "Database initialization failed: {}", e);
                connection.state = ReadyState::Disconnected;
                connection.pool = None;
                Err(e)
            }
        }
    }

    /// Pool for a query, connecting first if needed.
    ///
    /// Used by the collaborators, which can run while the database gate's
    /// reconnect is still in flight. A failed connect is `ServiceUnavailable`.
    pub async fn acquire(&self) -> AppResult<SqlitePool> {
        self.init()
            .await
            .map_err(|e| AppError::ServiceUnavailable(e.to_string()))
    }

    async fn connect(&self) -> AppResult<SqlitePool> {
        let pool = SqlitePoolOptions::new()
            .max_connections(self.max_connections)
            .connect(&self.url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(pool)
    }

    /// Close the pool, e.g. on shutdown.
    pub async fn close(&self) {
        let _attempt = self.init_lock.lock().await;

        let pool = {
            let mut connection = self.connection.write().await;
            connection.state = ReadyState::Disconnecting;
            connection.pool.take()
        };

        if let Some(pool) = pool {
            pool.close().await;
        }

        self.connection.write().await.state = ReadyState::Disconnected;
    }
}

/// URL that can never be opened: no create flag and a missing directory.
#[cfg(test)]
pub const UNREACHABLE_DATABASE_URL: &str = "sqlite:/nonexistent-helpdesk-gate-dir/gate.db";

/// URL of a fresh on-disk database in the temp directory. Unlike
/// `sqlite::memory:`, its contents survive `close` and a later `init`.
#[cfg(test)]
pub(crate) fn temp_database_url(name: &str) -> String {
    let path = std::env::temp_dir().join(format!(
        "helpdesk-gate-{}-{}.db",
        name,
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);
    format!("sqlite:{}?mode=rwc", path.display())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn starts_disconnected() {
        let db = Database::new("sqlite::memory:", 1);

        assert_eq!(db.ready_state().await, ReadyState::Disconnected);
        assert!(db.pool().await.is_none());
    }

    #[tokio::test]
    async fn init_connects_and_migrates() {
        let db = Database::new("sqlite::memory:", 1);

        let pool = db.init().await.unwrap();
        assert_eq!(db.ready_state().await, ReadyState::Connected);

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn init_failure_leaves_database_disconnected() {
        let db = Database::new(UNREACHABLE_DATABASE_URL, 1);

        assert!(db.init().await.is_err());
        assert_eq!(db.ready_state().await, ReadyState::Disconnected);
    }

    #[tokio::test]
    async fn close_then_init_reconnects() {
        let db = Database::new("sqlite::memory:", 1);
        db.init().await.unwrap();

        db.close().await;
        assert_eq!(db.ready_state().await, ReadyState::Disconnected);

        db.init().await.unwrap();
        assert_eq!(db.ready_state().await, ReadyState::Connected);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_inits_share_one_connection() {
        let db = Arc::new(Database::new(temp_database_url("concurrent-init"), 2));

        let attempts: Vec<_> = (0..16)
            .map(|_| {
                let db = db.clone();
                tokio::spawn(async move { db.init().await })
            })
            .collect();

        for attempt in attempts {
            assert!(attempt.await.unwrap().is_ok());
        }
        assert_eq!(db.ready_state().await, ReadyState::Connected);

        let migrations: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _sqlx_migrations")
            .fetch_one(&db.pool().await.unwrap())
            .await
            .unwrap();
        assert_eq!(migrations, 1);
    }

    #[tokio::test]
    async fn acquire_connects_on_demand() {
        let db = Database::new("sqlite::memory:", 1);

        db.acquire().await.unwrap();

        assert_eq!(db.ready_state().await, ReadyState::Connected);
    }

    #[tokio::test]
    async fn acquire_reports_failed_connect_as_unavailable() {
        let db = Database::new(UNREACHABLE_DATABASE_URL, 1);

        let result = db.acquire().await;

        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
        assert_eq!(db.ready_state().await, ReadyState::Disconnected);
    }

    #[test]
    fn ready_state_displays_name_and_code() {
        assert_eq!(ReadyState::Connecting.to_string(), "connecting (2)");
    }
}
