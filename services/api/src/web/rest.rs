//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for document extraction and the one-shot study
//! actions, and the master definition for the OpenAPI specification.

use crate::{
    error::{ApiError, ErrorResponse},
    web::{
        protocol::{
            ChatRequest, ChatResponse, CreateSessionResponse, ExtractResponse, FlashcardDto,
            HistoryResponse, NotesResponse, StudyQuery, StudyResponse, TurnDto,
        },
        render::flashcards_page,
        state::AppState,
        upload::read_upload_form,
    },
};
use axum::{
    extract::{Multipart, Query, State},
    response::{Html, IntoResponse, Json, Response},
};
use std::sync::Arc;
use study_assistant_core::{PortError, StudyAction};
use tracing::info;
use utoipa::OpenApi;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        extract_handler,
        study_handler,
        crate::web::chat::create_session_handler,
        crate::web::chat::end_session_handler,
        crate::web::chat::upload_notes_handler,
        crate::web::chat::chat_handler,
        crate::web::chat::history_handler,
    ),
    components(
        schemas(
            ExtractResponse, StudyResponse, FlashcardDto, CreateSessionResponse, NotesResponse,
            ChatRequest, ChatResponse, TurnDto, HistoryResponse, ErrorResponse
        )
    ),
    tags(
        (name = "Study Assistant API", description = "Turn uploaded notes into summaries, quizzes, flashcards and tutoring chats.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Extract the text of an uploaded PDF or image.
///
/// Accepts a multipart/form-data request with a `file` part (pdf, png, jpg or jpeg).
#[utoipa::path(
    post,
    path = "/extract",
    request_body(content_type = "multipart/form-data", description = "The document to read."),
    responses(
        (status = 200, description = "Text extracted (possibly empty)", body = ExtractResponse),
        (status = 400, description = "Missing file", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 422, description = "Unreadable file", body = ErrorResponse)
    )
)]
pub async fn extract_handler(
    State(app_state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ExtractResponse>, ApiError> {
    let (document, _) = read_upload_form(multipart).await?.require_document()?;
    let text = app_state.assistant.extract(&document).await?;

    Ok(Json(ExtractResponse {
        characters: text.char_count(),
        empty: text.is_empty(),
        text: text.into_string(),
    }))
}

/// Generate a summary, quiz or flashcards from an uploaded document.
///
/// Accepts a multipart/form-data request with a `file` part and an `action` part
/// (`summary`, `quiz` or `flashcards`). With `format=html`, flashcards are returned
/// as a page of flip cards.
#[utoipa::path(
    post,
    path = "/study",
    request_body(content_type = "multipart/form-data", description = "The document and the requested action."),
    params(StudyQuery),
    responses(
        (status = 200, description = "Study artifact generated", body = StudyResponse),
        (status = 400, description = "Missing file or unknown action", body = ErrorResponse),
        (status = 415, description = "Unsupported file type", body = ErrorResponse),
        (status = 422, description = "Unreadable file", body = ErrorResponse),
        (status = 502, description = "Completion endpoint failed", body = ErrorResponse)
    )
)]
pub async fn study_handler(
    State(app_state): State<Arc<AppState>>,
    Query(query): Query<StudyQuery>,
    multipart: Multipart,
) -> Result<Response, ApiError> {
    let (document, action) = read_upload_form(multipart).await?.require_document()?;
    let action: StudyAction = action
        .ok_or_else(|| PortError::InvalidInput("Multipart form must include an action".to_string()))?
        .parse()?;

    let as_html = match query.format.as_deref() {
        None | Some("json") => false,
        Some("html") if action == StudyAction::Flashcards => true,
        Some("html") => {
            return Err(PortError::InvalidInput(
                "format=html is only available for flashcards".to_string(),
            )
            .into())
        }
        Some(other) => {
            return Err(PortError::InvalidInput(format!("unknown format '{}'", other)).into())
        }
    };

    info!("Running '{}' for '{}'", action.as_str(), document.label());
    let output = app_state.assistant.run(action, &document).await?;

    if as_html {
        let cards = output
            .flashcards
            .map(|parse| parse.cards)
            .unwrap_or_default();
        return Ok(Html(flashcards_page(&cards)).into_response());
    }
    Ok(Json(StudyResponse::from(output)).into_response())
}
