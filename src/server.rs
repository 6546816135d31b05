use crate::api::analytics;
use crate::dashboard;
use crate::ingest::handler::{ingest_event, AppState};
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

/// Build the Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Permissive CORS for the API (the tracking snippet runs on any origin)
    let api_cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    // 64 KB body limit; a click batch stays well under that
    let api_routes = Router::new()
        .route(
            "/analytics",
            axum::routing::post(ingest_event).get(analytics::get_analytics),
        )
        .route("/analytics/stats", get(analytics::get_stats))
        .layer(DefaultBodyLimit::max(65_536))
        .layer(api_cors);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .route("/", get(dashboard::serve_index))
        .route("/dashboard", get(dashboard::serve_dashboard))
        .route("/{*path}", get(dashboard::serve_asset))
        .layer(axum::middleware::map_response(add_security_headers))
        .layer(TimeoutLayer::with_status_code(
            axum::http::StatusCode::REQUEST_TIMEOUT,
            std::time::Duration::from_secs(30),
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Inject OWASP-recommended security headers on every HTTP response.
async fn add_security_headers(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        "referrer-policy",
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );
    // Content-Security-Policy only on HTML responses (avoids breaking JSON APIs)
    let is_html = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("text/html"));
    if is_html {
        headers.insert(
            "content-security-policy",
            HeaderValue::from_static("default-src 'self'; script-src 'self'; style-src 'self'"),
        );
    }
    response
}

/// GET /health: simple health check endpoint.
async fn health_check() -> &'static str {
    "ok"
}
