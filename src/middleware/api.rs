//! Access-token authentication for API routes.

use super::{current_user, CurrentUser};
use crate::error::{AppError, AppResult};
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Request header carrying an API client's access token.
pub const ACCESS_TOKEN_HEADER: &str = "accesstoken";

pub const INVALID_ACCESS_TOKEN: &str = "Invalid Access Token";

/// Authenticate an API request.
///
/// Without an `accesstoken` header the request falls back to the session user.
/// With one, the token must resolve to a non-deleted user, who is attached to
/// the request without a password. Lookup errors are returned to the client as
/// the 401 message.
pub async fn authenticate_api_request(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let token = match request.headers().get(ACCESS_TOKEN_HEADER) {
        Some(value) => match value.to_str() {
            Ok(token) => Some(token.to_string()),
            Err(_) => {
                tracing::debug!("Access token header is not valid UTF-8");
                return Err(AppError::Unauthorized(INVALID_ACCESS_TOKEN.to_string()));
            }
        },
        None => None,
    };

    let Some(token) = token else {
        if current_user(&request).is_none() {
            tracing::debug!("API request without access token or session user");
            return Err(AppError::Unauthorized(INVALID_ACCESS_TOKEN.to_string()));
        }

        return Ok(next.run(request).await);
    };

    let user = state
        .users
        .find_by_access_token(&token)
        .await
        .map_err(|e| {
            tracing::debug!("Access token lookup failed: {}", e);
            AppError::Unauthorized(e.to_string())
        })?
        .filter(|user| !user.deleted)
        .ok_or_else(|| AppError::Unauthorized(INVALID_ACCESS_TOKEN.to_string()))?;

    tracing::debug!(user_id = user.id, "API request authenticated by access token");
    request
        .extensions_mut()
        .insert(CurrentUser(user.without_password()));

    Ok(next.run(request).await)
}
