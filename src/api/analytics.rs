use crate::api::errors::ApiError;
use crate::ingest::handler::AppState;
use crate::query::{self, StatsReport};
use crate::storage::records::Session;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use std::sync::Arc;

/// GET /api/analytics: the raw session collection, in insertion order.
pub async fn get_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Session>>, ApiError> {
    let state2 = Arc::clone(&state);
    let sessions = tokio::task::spawn_blocking(move || state2.store.read_sessions())
        .await
        .map_err(|e| ApiError::Internal(format!("Read task panicked: {e}")))?;

    Ok(Json(sessions))
}

/// GET /api/analytics/stats: the derived statistics report.
///
/// Takes one consistent snapshot of both records, then aggregates outside
/// the store lock.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Result<Json<StatsReport>, ApiError> {
    let now = Utc::now();

    let state2 = Arc::clone(&state);
    let report = tokio::task::spawn_blocking(move || {
        let (sessions, counters) = state2.store.snapshot();
        query::aggregate(&sessions, &counters, now, state2.utc_offset)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Stats task panicked: {e}")))?;

    Ok(Json(report))
}
