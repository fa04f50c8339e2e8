//! Axum route handlers for résumé upload and analysis.

use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    Json,
};
use serde::Serialize;
use tracing::{debug, info, Span};

use crate::errors::AppError;
use crate::extraction::{MediaType, UploadedDocument};
use crate::state::AppState;

const UNKNOWN_MEDIA_TYPE: &str = "application/octet-stream";

#[derive(Debug, Serialize)]
pub struct AnalysisResponse {
    pub analysis: String,
}

#[derive(Debug, Serialize)]
pub struct UploadReceipt {
    pub filename: Option<String>,
    pub message: String,
}

/// Fields of the `/analyze` form once the file has been accepted.
struct AnalyzeForm {
    document: UploadedDocument,
    job_role: String,
}

/// POST /analyze
///
/// Multipart `file` (PDF or plain text) plus optional `job_role`.
/// Failures come back as `{"error": ...}` through `AppError`.
#[tracing::instrument(
    skip_all,
    fields(
        request_id = %uuid::Uuid::new_v4(),
        filename = tracing::field::Empty,
        media_type = tracing::field::Empty,
    )
)]
pub async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<AnalysisResponse>, AppError> {
    let form = read_analyze_form(multipart?).await?;
    info!(
        bytes = form.document.content.len(),
        job_role = %form.job_role,
        "Analyzing resume"
    );

    let analysis = state.analysis.analyze(&form.document, &form.job_role).await?;
    info!(chars = analysis.len(), "Analysis complete");

    Ok(Json(AnalysisResponse { analysis }))
}

/// POST /upload
///
/// Diagnostic endpoint: accepts a `file` field and echoes its name.
pub async fn handle_upload(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadReceipt>, AppError> {
    let mut multipart = multipart?;
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().map(String::from);
        let bytes = field.bytes().await?;
        debug!(filename = ?filename, bytes = bytes.len(), "File received");
        return Ok(Json(UploadReceipt {
            filename,
            message: "File received successfully!".to_string(),
        }));
    }
    Err(AppError::MissingFile)
}

/// Reads the form, rejecting an unsupported file type before its body is read.
async fn read_analyze_form(mut multipart: Multipart) -> Result<AnalyzeForm, AppError> {
    let mut document = None;
    let mut job_role = String::new();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let media_type = field
                    .content_type()
                    .unwrap_or(UNKNOWN_MEDIA_TYPE)
                    .to_string();
                let file_name = field.file_name().unwrap_or("upload").to_string();
                // Recorded before the type check; rejected uploads carry them too.
                let span = Span::current();
                span.record("filename", file_name.as_str());
                span.record("media_type", media_type.as_str());
                MediaType::require(&media_type)?;
                let content = field.bytes().await?;
                document = Some(UploadedDocument::new(content, media_type, file_name));
            }
            Some("job_role") => job_role = field.text().await?,
            _ => {}
        }
    }

    let document = document.ok_or(AppError::MissingFile)?;
    Ok(AnalyzeForm { document, job_role })
}
