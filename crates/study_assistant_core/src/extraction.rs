//! crates/study_assistant_core/src/extraction.rs
//!
//! Turns an uploaded document into plain text by dispatching on its declared
//! media type to either the PDF text port or the OCR port.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::domain::{ExtractedText, MediaType, UploadedDocument};
use crate::ports::{OcrService, PdfTextService, PortResult, TextExtractionService};

/// Joins per-page text into one newline-terminated segment per page.
///
/// A page with no text contributes an empty segment so the page structure survives.
pub fn join_pages(pages: &[Option<String>]) -> String {
    let mut text = String::new();
    for page in pages {
        if let Some(page_text) = page {
            text.push_str(page_text.trim_end());
        }
        text.push('\n');
    }
    text
}

/// The default [`TextExtractionService`]: PDF text extraction or OCR, never both.
#[derive(Clone)]
pub struct DocumentExtractor {
    pdf: Arc<dyn PdfTextService>,
    ocr: Arc<dyn OcrService>,
}

impl DocumentExtractor {
    pub fn new(pdf: Arc<dyn PdfTextService>, ocr: Arc<dyn OcrService>) -> Self {
        Self { pdf, ocr }
    }
}

#[async_trait]
impl TextExtractionService for DocumentExtractor {
    async fn extract(&self, document: &UploadedDocument) -> PortResult<ExtractedText> {
        let start = Instant::now();

        let raw = match document.media_type {
            MediaType::Pdf => {
                let pages = self.pdf.page_texts(&document.bytes).await?;
                info!("Read {} PDF page(s) from '{}'", pages.len(), document.label());
                join_pages(&pages)
            }
            MediaType::Image(_) => self.ocr.recognize(&document.bytes).await?,
        };

        let text = ExtractedText::new(raw);
        if text.is_empty() {
            warn!("No text detected in '{}' ({})", document.label(), document.media_type);
        }
        info!(
            "⏱️ Extraction of '{}' took {:?} ({} chars)",
            document.label(),
            start.elapsed(),
            text.char_count()
        );
        Ok(text)
    }
}
