//! Serves the dashboard shell: index.html with the maps API key injected
//! at serve time (the key stays in the environment, never on disk), plus
//! the PWA files that must live at root scope.

use std::path::Path;
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{Html, IntoResponse, Response};

use crate::AppState;

/// GET / — the HTML shell, with `__GOOGLE_MAPS_API_KEY__` substituted.
pub async fn serve_index(State(state): State<Arc<AppState>>) -> Response {
    let path = Path::new(&state.config.frontend_dir).join("index.html");
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => {
            Html(html.replace("__GOOGLE_MAPS_API_KEY__", &state.config.google_maps_api_key))
                .into_response()
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "frontend shell unavailable");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

pub async fn serve_manifest(State(state): State<Arc<AppState>>) -> Response {
    serve_file(
        &state.config.frontend_dir,
        "manifest.json",
        "application/manifest+json",
    )
    .await
}

/// The service worker must be served from the root path so its scope
/// covers the whole origin.
pub async fn serve_service_worker(State(state): State<Arc<AppState>>) -> Response {
    serve_file(
        &state.config.frontend_dir,
        "service-worker.js",
        "application/javascript",
    )
    .await
}

async fn serve_file(dir: &str, name: &str, content_type: &'static str) -> Response {
    let path = Path::new(dir).join(name);
    match tokio::fs::read(&path).await {
        Ok(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}
