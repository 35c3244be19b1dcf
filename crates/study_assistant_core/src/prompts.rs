//! crates/study_assistant_core/src/prompts.rs
//!
//! The fixed prompt templates and the builder that wraps extracted text
//! (and, for tutoring, the running conversation) into the message list sent
//! to the completion endpoint.

use std::borrow::Cow;
use tracing::warn;

use crate::domain::{ChatHistory, ConversationTurn, ExtractedText, Role, StudyAction};

const SUMMARIZE_TEMPLATE: &str = r#"Summarize the following notes in simple bullet points
suitable for school students:

{text}"#;

const QUIZ_TEMPLATE: &str = r#"Create exactly 5 quiz questions with answers based on these notes:

{text}"#;

const FLASHCARDS_TEMPLATE: &str = r#"Create flashcards from these notes.
Format as:
Question - Answer

Write one flashcard per line and nothing else.

{text}"#;

pub const TUTOR_PERSONA: &str = r#"You are an AI Tutor for secondary school students.
Explain concepts clearly and simply.
Be encouraging and supportive.
If a student asks for an answer, explain the idea instead of giving a direct answer.
Do not provide direct exam answers."#;

const TUTOR_NOTES_TEMPLATE: &str = r#"Use the following study notes to answer the student's questions.

STUDY NOTES:
{notes}"#;

/// Appended to context that was cut to fit the configured cap.
pub const TRUNCATION_MARKER: &str = "\n[truncated]";

/// The default cap on embedded document text, in characters.
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 60_000;

/// Builds the message sequences for every study action and for tutoring chat.
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    max_context_chars: Option<usize>,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(Some(DEFAULT_MAX_CONTEXT_CHARS))
    }
}

impl PromptBuilder {
    /// `None` embeds documents whole.
    pub fn new(max_context_chars: Option<usize>) -> Self {
        Self { max_context_chars }
    }

    pub fn unbounded() -> Self {
        Self::new(None)
    }

    /// The single user turn for a one-shot study action.
    pub fn study_messages(&self, action: StudyAction, text: &ExtractedText) -> Vec<ConversationTurn> {
        let template = match action {
            StudyAction::Summarize => SUMMARIZE_TEMPLATE,
            StudyAction::Quiz => QUIZ_TEMPLATE,
            StudyAction::Flashcards => FLASHCARDS_TEMPLATE,
        };
        let context = self.bound_context(text.as_str());
        vec![ConversationTurn::user(template.replace("{text}", &context))]
    }

    /// The system turn a new tutoring session is seeded with.
    pub fn tutor_seed_turn(&self) -> ConversationTurn {
        ConversationTurn::system(TUTOR_PERSONA)
    }

    /// The full request for a tutoring reply: a fresh system turn (persona plus
    /// notes, when present), the prior non-system turns, then the new message.
    pub fn chat_messages(
        &self,
        notes: Option<&ExtractedText>,
        history: &ChatHistory,
        message: &str,
    ) -> Vec<ConversationTurn> {
        let system = match notes {
            Some(notes) => {
                let context = self.bound_context(notes.as_str());
                format!(
                    "{}\n\n{}",
                    TUTOR_PERSONA,
                    TUTOR_NOTES_TEMPLATE.replace("{notes}", &context)
                )
            }
            None => TUTOR_PERSONA.to_string(),
        };

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ConversationTurn::system(system));
        messages.extend(
            history
                .turns()
                .iter()
                .filter(|turn| turn.role != Role::System)
                .cloned(),
        );
        messages.push(ConversationTurn::user(message));
        messages
    }

    /// Caps `text` at the configured number of characters, cutting on a char boundary.
    pub fn bound_context<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let Some(limit) = self.max_context_chars else {
            return Cow::Borrowed(text);
        };

        match text.char_indices().nth(limit) {
            Some((cut, _)) => {
                warn!(
                    "Truncating document context from {} to {} characters",
                    text.chars().count(),
                    limit
                );
                Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER))
            }
            None => Cow::Borrowed(text),
        }
    }
}
