use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "src/dashboard/assets/"]
struct Assets;

/// Serve embedded static files (tracker snippet, dashboard css/js).
pub async fn serve_asset(
    axum::extract::Path(path): axum::extract::Path<String>,
) -> impl IntoResponse {
    serve_file(&path)
}

/// Serve the tracked landing page for the root path.
pub async fn serve_index() -> impl IntoResponse {
    serve_file("index.html")
}

/// Serve the analytics dashboard page.
pub async fn serve_dashboard() -> impl IntoResponse {
    serve_file("dashboard.html")
}

fn serve_file(path: &str) -> impl IntoResponse {
    match Assets::get(path) {
        Some(content) => {
            let mime = mime_guess::from_path(path).first_or_octet_stream();
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, mime.as_ref().to_string())],
                content.data.to_vec(),
            )
                .into_response()
        }
        None => StatusCode::NOT_FOUND.into_response(),
    }
}
