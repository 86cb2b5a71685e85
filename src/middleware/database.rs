//! Database readiness gate.

use crate::db::{DbHandle, ReadyState};
use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};

/// Make sure the database is connected, reconnecting if it isn't.
///
/// When connected, the pool is attached to the request as [`DbHandle`].
///
/// Otherwise a reconnect is started in the background and the request is
/// passed on straight away, without waiting for the reconnect. Such a request
/// runs without a `DbHandle`; collaborators it calls wait for the reconnect
/// through [`Database::acquire`](crate::db::Database::acquire). If the
/// reconnect fails before the downstream handler has answered, the handler is
/// dropped and the client gets `503`; if the handler answers first, its
/// response is sent.
pub async fn ensure_database_ready(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let ready_state = state.db.ready_state().await;

    if ready_state == ReadyState::Connected {
        if let Some(pool) = state.db.pool().await {
            request.extensions_mut().insert(DbHandle(pool));
        }
        return next.run(request).await;
    }

    tracing::warn!(%ready_state, "Database not ready, reinitializing");

    let db = state.db.clone();
    let mut init = tokio::spawn(async move { db.init().await });

    let downstream = next.run(request);
    tokio::pin!(downstream);

    tokio::select! {
        biased;

        response = &mut downstream => response,
        joined = &mut init => match joined {
            Ok(Ok(_)) => downstream.await,
            Ok(Err(e)) => AppError::ServiceUnavailable(e.to_string()).into_response(),
            Err(e) => {
                tracing::error!("Database initialization task failed: {}", e);
                downstream.await
            }
        },
    }
}
