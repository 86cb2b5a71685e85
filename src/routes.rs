//! Route table: which gates guard which routes.

use crate::handlers::{auth::logout, health::health_check, pages, users::get_current_user};
use crate::middleware::{
    api::authenticate_api_request,
    auth::{
        load_session_user, redirect_authenticated_away_from_login, require_authentication,
        require_second_factor_capable,
    },
    cache::cache,
    database::ensure_database_ready,
    viewdata::load_common_view_data,
};
use crate::state::AppState;
use axum::{
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Router,
};
use tower_http::services::ServeDir;

/// Build the application router.
///
/// Gates run outside-in: database readiness, then session user loading, then
/// the per-route gates. Session, CORS and tracing layers are added by the caller.
pub fn build_router(state: AppState, static_dir: &str, static_cache_seconds: u64) -> Router {
    let pages = Router::new()
        .route(
            "/",
            get(pages::login_page).layer(from_fn(redirect_authenticated_away_from_login)),
        )
        .route(
            "/l2auth",
            get(pages::second_factor_page).layer(from_fn(require_second_factor_capable)),
        )
        .route(
            "/dashboard",
            get(pages::dashboard)
                .layer(from_fn_with_state(state.clone(), load_common_view_data))
                .layer(from_fn(require_authentication)),
        )
        .route("/logout", post(logout));

    let api = Router::new().route(
        "/api/v1/users/me",
        get(get_current_user).layer(from_fn_with_state(state.clone(), authenticate_api_request)),
    );

    let assets = Router::new()
        .fallback_service(ServeDir::new(static_dir))
        .layer(cache(static_cache_seconds));

    Router::new()
        .merge(pages)
        .merge(api)
        .layer(from_fn_with_state(state.clone(), load_session_user))
        .route("/health", get(health_check))
        .nest_service("/assets", assets)
        .layer(from_fn_with_state(state.clone(), ensure_database_ready))
        .with_state(state)
}
