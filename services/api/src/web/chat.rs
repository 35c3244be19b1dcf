//! services/api/src/web/chat.rs
//!
//! Axum handlers for tutoring sessions: create a session, attach study notes,
//! exchange messages, and read back the conversation.

use crate::{
    error::{ApiError, ErrorResponse},
    web::{
        protocol::{
            ChatRequest, ChatResponse, CreateSessionResponse, HistoryResponse, NotesResponse,
            TurnDto,
        },
        state::AppState,
        upload::read_upload_form,
    },
};
use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use std::sync::Arc;
use std::time::Instant;
use study_assistant_core::{PortError, TutorSession};
use tracing::{info, warn};
use uuid::Uuid;

/// Start a new tutoring session.
#[utoipa::path(
    post,
    path = "/sessions",
    responses(
        (status = 201, description = "Session created successfully", body = CreateSessionResponse)
    )
)]
pub async fn create_session_handler(
    State(app_state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let session = TutorSession::new(app_state.assistant.prompts());
    let session_id = app_state.sessions.insert(session).await;
    (StatusCode::CREATED, Json(CreateSessionResponse { session_id }))
}

/// End a tutoring session and discard its conversation.
#[utoipa::path(
    delete,
    path = "/sessions/{session_id}",
    params(
        ("session_id" = Uuid, Path, description = "The tutoring session.")
    ),
    responses(
        (status = 204, description = "Session ended"),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn end_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state.sessions.remove(session_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Attach study notes to a session.
///
/// Accepts a multipart/form-data request with a `file` part. The extracted text
/// replaces any notes attached earlier and is used as context for later replies.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/notes",
    request_body(content_type = "multipart/form-data", description = "The notes to study."),
    params(
        ("session_id" = Uuid, Path, description = "The tutoring session.")
    ),
    responses(
        (status = 200, description = "Notes attached", body = NotesResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 422, description = "Unreadable file", body = ErrorResponse)
    )
)]
pub async fn upload_notes_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<NotesResponse>, ApiError> {
    let session_lock = app_state.sessions.get(session_id).await?;
    let (document, _) = read_upload_form(multipart).await?.require_document()?;

    let notes = app_state.assistant.extract(&document).await?;
    let response = NotesResponse {
        characters: notes.char_count(),
        empty: notes.is_empty(),
    };
    if notes.is_empty() {
        warn!("No text detected in notes for session {}", session_id);
    }

    session_lock.lock().await.attach_notes(notes);
    Ok(Json(response))
}

/// Ask the tutor a question.
#[utoipa::path(
    post,
    path = "/sessions/{session_id}/messages",
    request_body = ChatRequest,
    params(
        ("session_id" = Uuid, Path, description = "The tutoring session.")
    ),
    responses(
        (status = 200, description = "Tutor replied", body = ChatResponse),
        (status = 400, description = "Empty message", body = ErrorResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse),
        (status = 502, description = "Completion endpoint failed", body = ErrorResponse)
    )
)]
pub async fn chat_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(PortError::InvalidInput("message must not be empty".to_string()).into());
    }

    let session_lock = app_state.sessions.get(session_id).await?;
    let mut session = session_lock.lock().await;

    let llm_start = Instant::now();
    let reply = session
        .ask(
            app_state.assistant.prompts(),
            app_state.assistant.completion(),
            message,
        )
        .await?;
    info!("⏱️ Tutor reply for session {} took: {:?}", session_id, llm_start.elapsed());

    Ok(Json(ChatResponse {
        reply,
        history_len: session.history().len(),
    }))
}

/// Read a session's conversation, oldest turn first.
#[utoipa::path(
    get,
    path = "/sessions/{session_id}/messages",
    params(
        ("session_id" = Uuid, Path, description = "The tutoring session.")
    ),
    responses(
        (status = 200, description = "The conversation so far", body = HistoryResponse),
        (status = 404, description = "Unknown session", body = ErrorResponse)
    )
)]
pub async fn history_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let session_lock = app_state.sessions.get(session_id).await?;
    let session = session_lock.lock().await;

    Ok(Json(HistoryResponse {
        session_id,
        has_notes: session.notes().is_some(),
        turns: session.history().turns().iter().map(TurnDto::from).collect(),
    }))
}
