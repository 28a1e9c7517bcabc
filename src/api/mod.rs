use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub mod frontend;
pub mod handlers;

/// Assemble the full application router: the two JSON feeds, health
/// check, and the static dashboard shell.
pub fn router(state: Arc<AppState>) -> Router {
    let static_dir = ServeDir::new(&state.config.frontend_dir);

    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/api/geodata", get(handlers::get_geodata))
        .route("/api/stats", get(handlers::get_stats))
        .route("/", get(frontend::serve_index))
        .route("/manifest.json", get(frontend::serve_manifest))
        .route("/service-worker.js", get(frontend::serve_service_worker))
        .nest_service("/static", static_dir)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        // Self-hosted dashboard: wide-open CORS is intentional.
        .layer(CorsLayer::permissive())
        .layer(axum::middleware::from_fn(request_id_middleware))
}

/// Injects a unique X-Request-Id into every response so clients can
/// correlate errors with server logs.
async fn request_id_middleware(
    req: axum::extract::Request,
    next: axum::middleware::Next,
) -> axum::response::Response {
    let req_id = uuid::Uuid::new_v4().to_string();
    let mut resp = next.run(req).await;
    if let Ok(val) = axum::http::HeaderValue::from_str(&req_id) {
        resp.headers_mut().insert("x-request-id", val);
    }
    resp
}
