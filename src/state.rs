//! # Application State
//!
//! Shared state handed to every gate and handler. It is built once at startup
//! and carries the collaborators the gates depend on: the database, the user
//! lookup and the view-data source. Axum clones it per request, which only
//! clones `Arc` pointers.

use crate::config::Config;
use crate::db::users::{SqliteUserStore, UserStore};
use crate::db::Database;
use crate::viewdata::{SqliteViewData, ViewDataProvider};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Database connection, possibly not yet (or no longer) connected
    pub db: Arc<Database>,

    /// User lookups for session and access-token authentication
    pub users: Arc<dyn UserStore>,

    /// Shared view context for rendered pages
    pub viewdata: Arc<dyn ViewDataProvider>,
}

impl AppState {
    /// State with explicitly supplied collaborators.
    pub fn new(
        db: Arc<Database>,
        users: Arc<dyn UserStore>,
        viewdata: Arc<dyn ViewDataProvider>,
    ) -> Self {
        AppState { db, users, viewdata }
    }

    /// State backed by the configured SQLite database.
    ///
    /// The database is not connected here; call `state.db.init()` (or let the
    /// database gate do it on the first request).
    pub fn from_config(config: &Config) -> Self {
        let db = Arc::new(Database::new(
            config.database_url.clone(),
            config.database_max_connections,
        ));

        let users = Arc::new(SqliteUserStore::new(db.clone()));
        let viewdata = Arc::new(SqliteViewData::new(db.clone(), config.site_title.clone()));

        AppState::new(db, users, viewdata)
    }
}
