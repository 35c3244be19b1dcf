pub mod chat;
pub mod protocol;
pub mod render;
pub mod rest;
pub mod state;
pub mod upload;

pub use chat::{
    chat_handler, create_session_handler, end_session_handler, history_handler,
    upload_notes_handler,
};
pub use rest::{extract_handler, study_handler, ApiDoc};

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, post},
    Router,
};
use state::AppState;
use std::sync::Arc;

/// Builds the API router with every route wired to the shared state.
pub fn router(app_state: Arc<AppState>) -> Router {
    let body_limit = app_state.config.max_upload_bytes;

    Router::new()
        .route("/extract", post(extract_handler))
        .route("/study", post(study_handler))
        .route("/sessions", post(create_session_handler))
        .route("/sessions/{session_id}", delete(end_session_handler))
        .route("/sessions/{session_id}/notes", post(upload_notes_handler))
        .route(
            "/sessions/{session_id}/messages",
            post(chat_handler).get(history_handler),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(app_state)
}
