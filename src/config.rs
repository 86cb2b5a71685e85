//! # Configuration Management
//!
//! Configuration is read from the environment (and an optional `.env` file).
//!
//! ## Environment Variables
//! - `HOST`: Server bind address (default: 127.0.0.1)
//! - `PORT`: Server port (default: 8118)
//! - `DATABASE_URL`: SQLite connection string
//! - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 5)
//! - `SESSION_INACTIVITY_HOURS`: Session lifetime without activity (default: 24)
//! - `SITE_TITLE`: Title passed to every rendered view (default: Helpdesk)
//! - `STATIC_DIR`: Directory served under `/assets` (default: public)
//! - `STATIC_CACHE_SECONDS`: `max-age` applied to static assets (default: 3600)

use anyhow::{Context, Result};
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host/IP address to bind to
    pub host: String,

    /// Server port number
    pub port: u16,

    /// SQLite database connection URL
    /// The "mode=rwc" suffix means: read, write, create if not exists
    pub database_url: String,

    /// Upper bound on pooled database connections
    pub database_max_connections: u32,

    /// Hours of inactivity after which a session expires
    pub session_inactivity_hours: i64,

    /// Site title exposed to views through the common view data
    pub site_title: String,

    /// Directory containing static assets
    pub static_dir: String,

    /// Cache lifetime for static assets, in seconds
    pub static_cache_seconds: u64,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// Missing variables fall back to defaults. A variable that is present but
    /// cannot be parsed (e.g. `PORT=http`) is an error.
    pub fn from_env() -> Result<Self> {
        // dotenvy doesn't error if the file is missing
        dotenvy::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parse_var("PORT", 8118)?,
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite:helpdesk.db?mode=rwc".to_string()),
            database_max_connections: parse_var("DATABASE_MAX_CONNECTIONS", 5)?,
            session_inactivity_hours: parse_var("SESSION_INACTIVITY_HOURS", 24)?,
            site_title: env::var("SITE_TITLE").unwrap_or_else(|_| "Helpdesk".to_string()),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| "public".to_string()),
            static_cache_seconds: parse_var("STATIC_CACHE_SECONDS", 3600)?,
        })
    }

    /// Socket address to bind the server to, e.g. "127.0.0.1:8118"
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .with_context(|| format!("{name} is not a valid value: {raw:?}")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
impl Config {
    /// Configuration for tests: in-memory database with a single connection
    /// so every query sees the same schema.
    pub fn for_tests() -> Self {
        Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            database_max_connections: 1,
            session_inactivity_hours: 1,
            site_title: "Helpdesk Test".to_string(),
            static_dir: "public".to_string(),
            static_cache_seconds: 60,
        }
    }
}
