//! # Health Check Handler
//!
//! Used by load balancers and monitoring systems.

use crate::state::AppState;
use axum::{extract::State, Json};
use serde_json::{json, Value};

/// Health check endpoint
///
/// ## Route
/// GET /health
///
/// ## Response
/// ```json
/// {
///   "status": "healthy",
///   "service": "helpdesk-gate",
///   "database": "connected (1)"
/// }
/// ```
///
/// Always 200 while the process is up; the database field reports the
/// connection state at the time of the request.
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let ready_state = state.db.ready_state().await;

    Json(json!({
        "status": "healthy",
        "service": "helpdesk-gate",
        "database": ready_state.to_string()
    }))
}
