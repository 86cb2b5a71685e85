//! # Middleware Module
//!
//! The request gates. Each gate runs ahead of a route and either lets the
//! request through, redirects it, or answers with an error.
//!
//! - `database`: reconnects the database when it is not ready
//! - `auth`: session authentication, login redirects and the two-factor gate
//! - `api`: access-token authentication for API clients
//! - `viewdata`: attaches the shared view context
//! - `cache`: `Cache-Control` header factory
//!
//! Gates read the signed-in user from the [`CurrentUser`] request extension and
//! the session from the extension the session layer installs. A route without a
//! session layer simply has no session.

pub mod api;
pub mod auth;
pub mod cache;
pub mod database;
pub mod viewdata;

use crate::db::models::User;
use axum::{
    extract::{OriginalUri, Request},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

pub const LOGIN_PATH: &str = "/";
pub const DASHBOARD_PATH: &str = "/dashboard";
pub const SECOND_FACTOR_PATH: &str = "/l2auth";

/// The authenticated user of the current request.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// `302 Found` to `location`.
pub fn redirect_found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

fn session_of(request: &Request) -> Option<Session> {
    request.extensions().get::<Session>().cloned()
}

fn current_user(request: &Request) -> Option<User> {
    request
        .extensions()
        .get::<CurrentUser>()
        .map(|CurrentUser(user)| user.clone())
}

/// Path and query the client asked for, before any nesting stripped a prefix.
fn requested_url(request: &Request) -> String {
    let uri = request
        .extensions()
        .get::<OriginalUri>()
        .map(|OriginalUri(uri)| uri)
        .unwrap_or(request.uri());

    uri.path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string())
}
