//! services/api/src/adapters/ocr.rs
//!
//! This module contains the adapter for optical character recognition backed by
//! the `tesseract` command-line tool. It implements the `OcrService` port from the
//! `core` crate.
//!
//! The image is streamed to tesseract over stdin, so uploads never touch the disk.

use async_trait::async_trait;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Instant;
use study_assistant_core::ports::{OcrService, PortError, PortResult};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements the `OcrService` port by invoking `tesseract`.
#[derive(Clone, Debug)]
pub struct TesseractAdapter {
    binary: PathBuf,
    language: String,
}

impl TesseractAdapter {
    /// Creates a new `TesseractAdapter`.
    pub fn new(binary: impl Into<PathBuf>, language: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            language: language.into(),
        }
    }

    /// Checks that the bytes decode as a supported raster image.
    fn validate_image(image_bytes: &[u8]) -> PortResult<()> {
        let format = image::guess_format(image_bytes)
            .map_err(|e| PortError::Extraction(format!("Unrecognized image data: {}", e)))?;
        image::load_from_memory_with_format(image_bytes, format)
            .map_err(|e| PortError::Extraction(format!("Failed to decode image: {}", e)))?;
        Ok(())
    }

    async fn run_tesseract(&self, image_bytes: Vec<u8>) -> PortResult<String> {
        let mut child = Command::new(&self.binary)
            .args(["stdin", "stdout", "-l", self.language.as_str(), "--psm", "1"])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PortError::Unexpected(format!(
                    "Failed to run OCR engine '{}': {}",
                    self.binary.display(),
                    e
                ))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| PortError::Unexpected("OCR engine stdin unavailable".to_string()))?;
        // Feed stdin concurrently so a full stdout pipe cannot stall the child.
        let writer = tokio::spawn(async move {
            stdin.write_all(&image_bytes).await?;
            stdin.shutdown().await
        });

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| PortError::Unexpected(format!("OCR engine did not finish: {}", e)))?;

        if let Ok(Err(e)) = writer.await {
            debug!("Writing image to OCR engine ended early: {}", e);
        }

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!("Tesseract exited with {}: {}", output.status, stderr.trim());
            return Err(PortError::Extraction(format!(
                "OCR engine could not read the image: {}",
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

//=========================================================================================
// `OcrService` Trait Implementation
//=========================================================================================

#[async_trait]
impl OcrService for TesseractAdapter {
    async fn recognize(&self, image_bytes: &[u8]) -> PortResult<String> {
        let image_bytes = image_bytes.to_vec();
        let image_bytes = tokio::task::spawn_blocking(move || {
            Self::validate_image(&image_bytes).map(|_| image_bytes)
        })
        .await
        .map_err(|e| PortError::Unexpected(format!("Image validation task failed: {}", e)))??;

        let ocr_start = Instant::now();
        let text = self.run_tesseract(image_bytes).await?;
        info!("⏱️ OCR took: {:?} ({} chars)", ocr_start.elapsed(), text.len());
        Ok(text)
    }
}
