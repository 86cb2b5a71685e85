//! # Session Data
//!
//! Typed access to the values this application keeps in a client's session.
//! The session itself lives in the tower-sessions store; these helpers only
//! fix the keys and value types.

use crate::error::AppResult;
use tower_sessions::Session;

/// Logged-in user's id, written by the login handler.
pub const SESSION_USER_ID_KEY: &str = "user_id";

/// Where to send the user after login.
pub const SESSION_REDIRECT_URL_KEY: &str = "redirect_url";

/// Second-factor marker, written by the TOTP verification handler.
pub const SESSION_SECOND_FACTOR_KEY: &str = "l2auth";

/// Marker value meaning the TOTP code was verified in this session.
pub const TOTP_MARKER: &str = "totp";

pub struct SessionUserId;

impl SessionUserId {
    /// Written by the login handler in production; tests seed sessions with it.
    #[cfg(test)]
    pub async fn insert(session: &Session, user_id: i64) -> AppResult<()> {
        session.insert(SESSION_USER_ID_KEY, user_id).await?;
        Ok(())
    }

    pub async fn get(session: &Session) -> AppResult<Option<i64>> {
        Ok(session.get(SESSION_USER_ID_KEY).await?)
    }

    /// Logs the user out of this session.
    pub async fn remove(session: &Session) -> AppResult<()> {
        session.remove::<i64>(SESSION_USER_ID_KEY).await?;
        Ok(())
    }
}

pub struct SessionRedirectUrl;

impl SessionRedirectUrl {
    pub async fn insert(session: &Session, url: &str) -> AppResult<()> {
        session.insert(SESSION_REDIRECT_URL_KEY, url).await?;
        Ok(())
    }

    pub async fn get(session: &Session) -> AppResult<Option<String>> {
        Ok(session.get(SESSION_REDIRECT_URL_KEY).await?)
    }
}

pub struct SessionSecondFactor;

impl SessionSecondFactor {
    /// Record a verified TOTP code.
    #[cfg(test)]
    pub async fn mark_verified(session: &Session) -> AppResult<()> {
        session.insert(SESSION_SECOND_FACTOR_KEY, TOTP_MARKER).await?;
        Ok(())
    }

    /// Whether the marker equals `totp`. Any other value counts as unverified.
    pub async fn is_verified(session: &Session) -> AppResult<bool> {
        let marker: Option<String> = session.get(SESSION_SECOND_FACTOR_KEY).await?;
        Ok(marker.as_deref() == Some(TOTP_MARKER))
    }

    pub async fn clear(session: &Session) -> AppResult<()> {
        session.remove::<String>(SESSION_SECOND_FACTOR_KEY).await?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn memory_session() -> Session {
    use std::sync::Arc;
    use tower_sessions::MemoryStore;

    Session::new(None, Arc::new(MemoryStore::default()), None)
}
