use crate::error::AppResult;
use crate::middleware::{redirect_found, LOGIN_PATH};
use crate::session::{SessionSecondFactor, SessionUserId};
use axum::response::Response;
use tower_sessions::Session;

pub async fn logout(session: Session) -> AppResult<Response> {
    if let Some(user_id) = SessionUserId::get(&session).await? {
        tracing::info!(user_id, "User logged out");
    }

    SessionUserId::remove(&session).await?;
    SessionSecondFactor::clear(&session).await?;
    session.flush().await?;

    Ok(redirect_found(LOGIN_PATH))
}
