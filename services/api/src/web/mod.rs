pub mod eviction;
pub mod protocol;
pub mod rest;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::sync::Arc;

pub use eviction::eviction_process;
pub use rest::ApiDoc;
pub use state::AppState;

/// Builds the API router over the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/upload", post(rest::upload_handler))
        .route("/api/sessions", post(rest::create_session_handler))
        .route("/api/sessions/quick-start", post(rest::quick_start_handler))
        .route("/api/session/{id}", get(rest::get_session_handler))
        .route("/api/session/{id}/next", get(rest::next_item_handler))
        .route("/api/session/{id}/submit", post(rest::submit_answer_handler))
        .route("/api/session/{id}/complete", post(rest::complete_session_handler))
        .route("/api/stats", get(rest::get_stats_handler))
        .route("/api/stats/sessions", post(rest::record_stats_handler))
        .layer(DefaultBodyLimit::max(app_state.config.max_content_size))
        .with_state(app_state)
}
