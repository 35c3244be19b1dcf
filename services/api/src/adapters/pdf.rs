//! services/api/src/adapters/pdf.rs
//!
//! This module contains the adapter for PDF text extraction backed by `lopdf`.
//! It implements the `PdfTextService` port from the `core` crate.

use async_trait::async_trait;
use lopdf::Document;
use study_assistant_core::ports::{PdfTextService, PortError, PortResult};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `PdfTextService` port by reading the PDF in memory.
#[derive(Clone, Debug, Default)]
pub struct LopdfAdapter;

impl LopdfAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Loads the document and extracts every page in page order.
    ///
    /// A page whose text cannot be extracted is reported as `None` rather than failing
    /// the whole document.
    fn read_pages(pdf_bytes: &[u8]) -> PortResult<Vec<Option<String>>> {
        let doc = Document::load_mem(pdf_bytes)
            .map_err(|e| PortError::Extraction(format!("Failed to load PDF: {}", e)))?;

        if doc.is_encrypted() {
            return Err(PortError::Extraction(
                "Encrypted PDFs are not supported".to_string(),
            ));
        }

        let pages = doc
            .get_pages()
            .into_keys()
            .map(|page_number| match doc.extract_text(&[page_number]) {
                Ok(text) => Some(text),
                Err(e) => {
                    debug!("No text extracted from page {}: {}", page_number, e);
                    None
                }
            })
            .collect();
        Ok(pages)
    }
}

//=========================================================================================
// `PdfTextService` Trait Implementation
//=========================================================================================

#[async_trait]
impl PdfTextService for LopdfAdapter {
    async fn page_texts(&self, pdf_bytes: &[u8]) -> PortResult<Vec<Option<String>>> {
        let bytes = pdf_bytes.to_vec();
        tokio::task::spawn_blocking(move || Self::read_pages(&bytes))
            .await
            .map_err(|e| PortError::Unexpected(format!("PDF extraction task failed: {}", e)))?
    }
}
