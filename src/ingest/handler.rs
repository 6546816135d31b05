use crate::api::errors::ApiError;
use crate::ingest::geoip::GeoResolver;
use crate::ingest::merger::{self, Identity, MatchStrategy};
use crate::storage::file_store::FileStore;
use axum::extract::State;
use axum::http::{header, HeaderMap};
use axum::Json;
use chrono::{FixedOffset, Utc};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

/// Page type whose views feed the page-view counter and the visitor set.
pub const LANDING_PAGE: &str = "index";

/// Inbound event payload from the tracking snippet.
///
/// Every field is optional: the snippet sends whatever it has, and each
/// missing field takes a typed default during the merge. Unknown fields are
/// ignored rather than rejected.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub event_type: Option<String>,
    pub page_type: Option<String>,
    pub session_id: Option<String>,
    #[serde(default)]
    pub session_info: PayloadSessionInfo,
    pub traffic_source: Option<crate::storage::records::TrafficSource>,
    pub event_data: Option<Value>,
    pub clicks: Option<Vec<Value>>,
}

/// Client-reported activity details. Only the focus flag is trusted from
/// the wire; everything else in the stored record is rebuilt server-side.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadSessionInfo {
    pub tab_focused: Option<bool>,
}

/// Shared application state.
pub struct AppState {
    pub store: FileStore,
    pub geo: GeoResolver,
    pub match_strategy: MatchStrategy,
    pub utc_offset: FixedOffset,
}

/// POST /api/analytics: ingestion endpoint.
///
/// Resolves the caller's identity, folds the event into its session under
/// the store lock, and bumps the counters for landing-page views. Always
/// answers `{"success": true}` once the cycle ran; persistence problems are
/// logged by the store rather than surfaced to the snippet.
pub async fn ingest_event(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(payload): Json<EventPayload>,
) -> Result<Json<Value>, ApiError> {
    let ip = extract_ip(&headers);
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let identity = Identity {
        session_id: resolve_session_id(payload.session_id.as_deref()),
        geo: state.geo.lookup(&ip),
        ip,
        user_agent,
    };

    let now = Utc::now();
    let landing_view = is_landing_page_view(&payload);
    let strategy = state.match_strategy;

    let state2 = Arc::clone(&state);
    let persisted = tokio::task::spawn_blocking(move || {
        state2.store.update(|sessions, counters| {
            match merger::find_match(sessions, &identity, strategy) {
                Some(idx) => {
                    let merged = merger::merge(Some(&sessions[idx]), &payload, &identity, now);
                    sessions[idx] = merged;
                }
                None => {
                    let created = merger::merge(None, &payload, &identity, now);
                    sessions.push(created);
                }
            }
            if landing_view {
                counters.record_page_view(&identity.ip);
            }
        })
    })
    .await
    .map_err(|e| ApiError::Internal(format!("Ingest task panicked: {e}")))?;

    // Write failures are logged, not surfaced: the event already merged.
    if let Err(e) = persisted {
        tracing::error!(error = %e, "Failed to persist analytics data");
    }

    Ok(Json(serde_json::json!({ "success": true })))
}

/// A client-sent id wins; a missing or empty one gets a fresh UUID, which
/// makes the event start its own session under the id strategies.
fn resolve_session_id(claimed: Option<&str>) -> String {
    match claimed {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => Uuid::new_v4().to_string(),
    }
}

/// Extract client IP from headers, checking X-Forwarded-For first.
fn extract_ip(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(str::trim)
        .or_else(|| headers.get("x-real-ip").and_then(|v| v.to_str().ok()))
        .unwrap_or("unknown")
        .to_string()
}

/// Only explicit landing-page views count toward the totals.
fn is_landing_page_view(payload: &EventPayload) -> bool {
    payload.event_type.as_deref() == Some("page_view")
        && payload.page_type.as_deref() == Some(LANDING_PAGE)
}
