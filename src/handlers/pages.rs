//! # Page Handlers
//!
//! Rendering lives in the front end; these handlers return the data a page
//! needs as JSON. Access control is done by the gates wrapped around each route.

use crate::error::AppResult;
use crate::middleware::CurrentUser;
use crate::session::SessionRedirectUrl;
use crate::viewdata::ViewData;
use axum::{Extension, Json};
use serde_json::{json, Value};
use tower_sessions::Session;

/// Login page
///
/// ## Route
/// GET /
///
/// Reports where the user will be sent after logging in, if a protected
/// page sent them here.
pub async fn login_page(session: Session) -> AppResult<Json<Value>> {
    let redirect_url = SessionRedirectUrl::get(&session).await?;

    Ok(Json(json!({
        "page": "login",
        "redirect_url": redirect_url
    })))
}

/// Second-factor code entry / setup page
///
/// ## Route
/// GET /l2auth
pub async fn second_factor_page(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<Value> {
    Json(json!({
        "page": "l2auth",
        "username": user.username,
        "has_second_factor": user.has_second_factor()
    }))
}

/// Dashboard
///
/// ## Route
/// GET /dashboard
pub async fn dashboard(Extension(viewdata): Extension<ViewData>) -> Json<ViewData> {
    Json(viewdata)
}
