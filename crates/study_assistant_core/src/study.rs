//! crates/study_assistant_core/src/study.rs
//!
//! The document-to-study-artifact pipeline: extract, template, complete, render.

use std::sync::Arc;
use std::time::Instant;
use tracing::info;

use crate::domain::{ExtractedText, StudyAction, StudyOutput, UploadedDocument};
use crate::flashcards::parse_flashcards;
use crate::ports::{CompletionService, PortResult, TextExtractionService};
use crate::prompts::PromptBuilder;

/// Runs one-shot study actions against uploaded documents.
#[derive(Clone)]
pub struct StudyAssistant {
    extractor: Arc<dyn TextExtractionService>,
    completion: Arc<dyn CompletionService>,
    prompts: PromptBuilder,
}

impl StudyAssistant {
    pub fn new(
        extractor: Arc<dyn TextExtractionService>,
        completion: Arc<dyn CompletionService>,
        prompts: PromptBuilder,
    ) -> Self {
        Self {
            extractor,
            completion,
            prompts,
        }
    }

    pub fn prompts(&self) -> &PromptBuilder {
        &self.prompts
    }

    pub fn completion(&self) -> &dyn CompletionService {
        self.completion.as_ref()
    }

    pub async fn extract(&self, document: &UploadedDocument) -> PortResult<ExtractedText> {
        self.extractor.extract(document).await
    }

    /// Generates the artifact for `action` from already-extracted text.
    pub async fn generate(&self, action: StudyAction, text: &ExtractedText) -> PortResult<StudyOutput> {
        let messages = self.prompts.study_messages(action, text);

        let llm_start = Instant::now();
        let raw = self.completion.complete(&messages).await?;
        info!("⏱️ {} generation took: {:?}", action.as_str(), llm_start.elapsed());

        let flashcards = match action {
            StudyAction::Flashcards => Some(parse_flashcards(&raw)),
            StudyAction::Summarize | StudyAction::Quiz => None,
        };

        Ok(StudyOutput {
            action,
            text: raw,
            flashcards,
        })
    }

    /// Extracts the document's text and generates the artifact for `action`.
    pub async fn run(&self, action: StudyAction, document: &UploadedDocument) -> PortResult<StudyOutput> {
        let text = self.extract(document).await?;
        self.generate(action, &text).await
    }
}
