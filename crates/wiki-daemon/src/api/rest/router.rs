//! API Router configuration

use super::handlers;
use super::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::get, Router};
use tower_http::trace::TraceLayer;

/// Create the main router
///
/// `/health` and `/status` are fixed routes; everything else goes through the
/// page path grammar.
pub fn create_router(state: AppState, max_body_size: usize) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/status", get(handlers::daemon_status))
        .fallback(handlers::dispatch_page)
        .layer(DefaultBodyLimit::max(max_body_size))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
