//! crates/study_assistant_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the study assistant's core logic.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the PDF library, the OCR engine and the completion API.

use async_trait::async_trait;

use crate::domain::{ConversationTurn, ExtractedText, UploadedDocument};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// The uploaded file could not be read (corrupt PDF, undecodable image, OCR failure).
    #[error("Extraction failed: {0}")]
    Extraction(String),
    /// The uploaded file is neither a PDF nor a supported image.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    /// The completion endpoint failed or returned unusable content.
    #[error("Generation failed: {0}")]
    Generation(String),
    /// The completion endpoint failed in a way that may succeed on retry.
    #[error("Generation endpoint unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Whether the failure is worth retrying.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait PdfTextService: Send + Sync {
    /// Returns the text of every page in page order. `None` marks a page whose
    /// text could not be determined.
    async fn page_texts(&self, pdf_bytes: &[u8]) -> PortResult<Vec<Option<String>>>;
}

#[async_trait]
pub trait OcrService: Send + Sync {
    /// Recognizes the text in a raster image.
    async fn recognize(&self, image_bytes: &[u8]) -> PortResult<String>;
}

#[async_trait]
pub trait TextExtractionService: Send + Sync {
    /// Converts an uploaded document into plain text.
    async fn extract(&self, document: &UploadedDocument) -> PortResult<ExtractedText>;
}

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Sends an ordered conversation to the completion endpoint and returns its reply.
    async fn complete(&self, messages: &[ConversationTurn]) -> PortResult<String>;
}
