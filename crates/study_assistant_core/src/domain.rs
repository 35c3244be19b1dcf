//! crates/study_assistant_core/src/domain.rs
//!
//! Defines the pure, core data structures for the study assistant.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::ports::{PortError, PortResult};

//=========================================================================================
// Uploaded Documents
//=========================================================================================

/// The raster image encodings accepted at the upload boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

/// The declared media type of an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    Image(ImageKind),
}

impl MediaType {
    /// Classifies a file name by its extension (`pdf`, `png`, `jpg`, `jpeg`).
    pub fn from_file_name(file_name: &str) -> PortResult<Self> {
        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .ok_or_else(|| {
                PortError::UnsupportedFormat(format!("'{}' has no file extension", file_name))
            })?;

        match extension.as_str() {
            "pdf" => Ok(Self::Pdf),
            "png" => Ok(Self::Image(ImageKind::Png)),
            "jpg" | "jpeg" => Ok(Self::Image(ImageKind::Jpeg)),
            other => Err(PortError::UnsupportedFormat(format!(
                "'.{}' files are not supported (expected pdf, png, jpg or jpeg)",
                other
            ))),
        }
    }

    /// Classifies a MIME type such as `application/pdf` or `image/png`.
    pub fn from_mime(mime: &str) -> PortResult<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        match essence.to_ascii_lowercase().as_str() {
            "application/pdf" => Ok(Self::Pdf),
            "image/png" => Ok(Self::Image(ImageKind::Png)),
            "image/jpeg" | "image/jpg" => Ok(Self::Image(ImageKind::Jpeg)),
            other => Err(PortError::UnsupportedFormat(format!(
                "media type '{}' is not supported",
                other
            ))),
        }
    }

    pub fn is_pdf(&self) -> bool {
        matches!(self, Self::Pdf)
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pdf => f.write_str("pdf"),
            Self::Image(ImageKind::Png) => f.write_str("png"),
            Self::Image(ImageKind::Jpeg) => f.write_str("jpeg"),
        }
    }
}

/// A file uploaded by a user. Held in memory only until its text is extracted.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub file_name: Option<String>,
    pub media_type: MediaType,
    pub bytes: Vec<u8>,
}

impl UploadedDocument {
    pub fn new(media_type: MediaType, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: None,
            media_type,
            bytes: bytes.into(),
        }
    }

    pub fn with_file_name(mut self, file_name: impl Into<String>) -> Self {
        self.file_name = Some(file_name.into());
        self
    }

    /// A short label for log lines.
    pub fn label(&self) -> &str {
        self.file_name.as_deref().unwrap_or("<unnamed>")
    }
}

/// The plain text recovered from an uploaded document. An empty value is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedText(String);

impl ExtractedText {
    /// Wraps raw text, trimming leading and trailing whitespace.
    pub fn new(text: impl AsRef<str>) -> Self {
        Self(text.as_ref().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of characters (not bytes).
    pub fn char_count(&self) -> usize {
        self.0.chars().count()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for ExtractedText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//=========================================================================================
// Conversations
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a conversation with the completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }
}

/// An append-only, ordered log of conversation turns.
#[derive(Debug, Clone, Default)]
pub struct ChatHistory {
    turns: Vec<ConversationTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

//=========================================================================================
// Study Artifacts
//=========================================================================================

/// A question/answer pair for rote-recall study.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flashcard {
    pub question: String,
    pub answer: String,
}

impl Flashcard {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

/// The result of parsing a flashcard response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlashcardParse {
    pub cards: Vec<Flashcard>,
    /// Non-blank lines that carried no delimiter and were skipped.
    pub dropped_lines: usize,
}

/// A one-shot action a user can request on an uploaded document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudyAction {
    Summarize,
    Quiz,
    Flashcards,
}

impl StudyAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Summarize => "summary",
            Self::Quiz => "quiz",
            Self::Flashcards => "flashcards",
        }
    }
}

impl std::str::FromStr for StudyAction {
    type Err = PortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "summary" | "summarize" => Ok(Self::Summarize),
            "quiz" => Ok(Self::Quiz),
            "flashcards" => Ok(Self::Flashcards),
            other => Err(PortError::InvalidInput(format!(
                "unknown action '{}' (expected summary, quiz or flashcards)",
                other
            ))),
        }
    }
}

/// The final artifact of a one-shot study action.
#[derive(Debug, Clone)]
pub struct StudyOutput {
    pub action: StudyAction,
    /// The completion text, verbatim.
    pub text: String,
    /// Present only for [`StudyAction::Flashcards`].
    pub flashcards: Option<FlashcardParse>,
}
