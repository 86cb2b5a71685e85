//! Attaches the shared view context to page requests.

use super::current_user;
use crate::error::AppResult;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

/// Fetch [`ViewData`](crate::viewdata::ViewData) for the current user and
/// attach it to the request. A failing provider ends the request with its error.
pub async fn load_common_view_data(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> AppResult<Response> {
    let user = current_user(&request);

    let data = state
        .viewdata
        .get_data(user.as_ref())
        .await
        .inspect_err(|e| tracing::error!("Failed to load view data: {}", e))?;

    request.extensions_mut().insert(data);

    Ok(next.run(request).await)
}
