//! services/api/src/web/protocol.rs
//!
//! Defines the JSON payloads exchanged between the browser client and the API server.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use study_assistant_core::{ConversationTurn, Flashcard, StudyOutput};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

//=========================================================================================
// Extraction and One-Shot Study Actions
//=========================================================================================

/// The text recovered from an uploaded document.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ExtractResponse {
    pub text: String,
    pub characters: usize,
    /// `true` when no text was detected in the document.
    pub empty: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug, Clone, PartialEq, Eq)]
pub struct FlashcardDto {
    pub question: String,
    pub answer: String,
}

impl From<Flashcard> for FlashcardDto {
    fn from(card: Flashcard) -> Self {
        Self {
            question: card.question,
            answer: card.answer,
        }
    }
}

/// The generated study artifact.
#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct StudyResponse {
    /// `summary`, `quiz` or `flashcards`.
    pub action: String,
    /// The completion text, verbatim.
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flashcards: Option<Vec<FlashcardDto>>,
    /// Lines of the flashcard response that had no `-` delimiter.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dropped_lines: Option<usize>,
}

impl From<StudyOutput> for StudyResponse {
    fn from(output: StudyOutput) -> Self {
        let (flashcards, dropped_lines) = match output.flashcards {
            Some(parse) => (
                Some(parse.cards.into_iter().map(FlashcardDto::from).collect()),
                Some(parse.dropped_lines),
            ),
            None => (None, None),
        };
        Self {
            action: output.action.as_str().to_string(),
            text: output.text,
            flashcards,
            dropped_lines,
        }
    }
}

#[derive(Deserialize, IntoParams, Debug, Default)]
#[into_params(parameter_in = Query)]
pub struct StudyQuery {
    /// `json` (default) or `html`; `html` renders flashcards as flip cards.
    pub format: Option<String>,
}

//=========================================================================================
// Tutoring Sessions
//=========================================================================================

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct NotesResponse {
    pub characters: usize,
    pub empty: bool,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ChatRequest {
    pub message: String,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct ChatResponse {
    pub reply: String,
    pub history_len: usize,
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct TurnDto {
    /// `system`, `user` or `assistant`.
    pub role: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ConversationTurn> for TurnDto {
    fn from(turn: &ConversationTurn) -> Self {
        Self {
            role: turn.role.as_str().to_string(),
            content: turn.content.clone(),
            created_at: turn.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema, Debug)]
pub struct HistoryResponse {
    pub session_id: Uuid,
    pub has_notes: bool,
    pub turns: Vec<TurnDto>,
}
