//! Resume upload

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tracing::info;

use super::client::ApiClient;
use crate::error::ApiError;

/// Formats the backend's parser accepts, by extension
const RESUME_MIME: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("doc", "application/msword"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
];

impl ApiClient {
    /// Upload a resume for the interview flow to draw questions from
    pub async fn upload_resume(&self, path: &Path) -> Result<(), ApiError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        let mime = RESUME_MIME
            .iter()
            .find(|(ext, _)| *ext == extension)
            .map(|(_, mime)| *mime)
            .ok_or_else(|| ApiError::UnsupportedResume(path.display().to_string()))?;

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let bytes = tokio::fs::read(path).await?;
        info!("Uploading resume {} ({} bytes)", file_name, bytes.len());

        let part = Part::bytes(bytes).file_name(file_name).mime_str(mime)?;
        let form = Form::new().part("resume", part);
        let request = self.authed(self.post("/new/resume/upload/pdf")).await?;
        let response = request.multipart(form).send().await?;
        self.handle_error_response(response)?;
        Ok(())
    }
}
