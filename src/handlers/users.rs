//! # User Handlers

use crate::db::models::User;
use crate::middleware::CurrentUser;
use axum::{Extension, Json};

/// Get the authenticated API user's profile
///
/// ## Route
/// GET /api/v1/users/me
///
/// ## Authentication
/// Access token or session, checked by the `authenticate_api_request` gate.
/// The password hash is never part of the response.
pub async fn get_current_user(Extension(CurrentUser(user)): Extension<CurrentUser>) -> Json<User> {
    Json(user.without_password())
}
