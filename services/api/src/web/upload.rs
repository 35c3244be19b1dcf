//! services/api/src/web/upload.rs
//!
//! Reads multipart uploads and enforces the accepted file types at the boundary.

use crate::error::ApiError;
use axum::extract::Multipart;
use study_assistant_core::{MediaType, PortError, PortResult, UploadedDocument};
use tracing::info;

/// The parts of a study form: a `file` and, for one-shot actions, an `action`.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub document: Option<UploadedDocument>,
    pub action: Option<String>,
}

impl UploadForm {
    pub fn require_document(self) -> Result<(UploadedDocument, Option<String>), ApiError> {
        match self.document {
            Some(document) => Ok((document, self.action)),
            None => Err(ApiError::Upload(
                "Multipart form must include a file".to_string(),
            )),
        }
    }
}

/// Decides the media type from the file name, falling back to the part's content type.
pub fn classify_upload(file_name: Option<&str>, content_type: Option<&str>) -> PortResult<MediaType> {
    let by_name = match file_name {
        Some(name) => MediaType::from_file_name(name),
        None => Err(PortError::UnsupportedFormat(
            "upload has no file name".to_string(),
        )),
    };
    match (by_name, content_type) {
        (Ok(media_type), _) => Ok(media_type),
        (Err(_), Some(mime)) if MediaType::from_mime(mime).is_ok() => MediaType::from_mime(mime),
        (Err(e), _) => Err(e),
    }
}

/// Reads every part of the form. Unknown parts are ignored.
pub async fn read_upload_form(mut multipart: Multipart) -> Result<UploadForm, ApiError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Upload(format!("Failed to read multipart data: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().map(str::to_string);
                let content_type = field.content_type().map(str::to_string);
                let media_type = classify_upload(file_name.as_deref(), content_type.as_deref())?;

                let data = field.bytes().await.map_err(|e| {
                    ApiError::Upload(format!("Failed to read file bytes: {}", e))
                })?;
                info!(
                    "Received upload {:?} ({}, {} bytes)",
                    file_name,
                    media_type,
                    data.len()
                );

                let mut document = UploadedDocument::new(media_type, data.to_vec());
                if let Some(file_name) = file_name {
                    document = document.with_file_name(file_name);
                }
                form.document = Some(document);
            }
            "action" => {
                let action = field.text().await.map_err(|e| {
                    ApiError::Upload(format!("Failed to read action field: {}", e))
                })?;
                form.action = Some(action);
            }
            _ => {}
        }
    }

    Ok(form)
}
