use std::any::Any;

use axum::{
    extract::multipart::{MultipartError, MultipartRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::extraction::ExtractionError;
use crate::llm_client::LlmError;

/// Per-request error type.
/// Implements `IntoResponse` so every failure reaches the client as `{"error": "..."}`
/// with a 200 status, which is what the frontend reads.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Unsupported file type '{0}'. Please upload a PDF or plain text file.")]
    UnsupportedMediaType(String),

    #[error("Empty or unreadable file.")]
    UnreadableFile,

    #[error("Could not read PDF: {0}")]
    UnreadablePdf(String),

    #[error("No file uploaded.")]
    MissingFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Error analyzing resume: {0}")]
    Llm(#[from] LlmError),

    #[error("Error analyzing resume: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::UnsupportedMediaType(t) => AppError::UnsupportedMediaType(t),
            ExtractionError::UnreadablePdf(detail) => AppError::UnreadablePdf(detail),
        }
    }
}

impl From<MultipartError> for AppError {
    fn from(err: MultipartError) -> Self {
        AppError::InvalidUpload(err.to_string())
    }
}

impl From<MultipartRejection> for AppError {
    fn from(rejection: MultipartRejection) -> Self {
        AppError::InvalidUpload(rejection.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match &self {
            AppError::Llm(e) => tracing::error!("LLM error: {e}"),
            AppError::Internal(e) => tracing::error!("Internal error: {e:?}"),
            AppError::UnreadablePdf(detail) => tracing::warn!("Unreadable PDF: {detail}"),
            other => tracing::warn!("Rejected upload: {other}"),
        }

        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::OK, body).into_response()
    }
}

/// Response for a handler that panicked, so a panic still yields `{"error": ...}`.
/// Installed through `tower_http::catch_panic::CatchPanicLayer::custom`.
pub fn panic_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::Internal(anyhow::anyhow!("handler panicked: {detail}")).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    async fn render(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_errors_render_as_ok_with_error_field() {
        let (status, body) = render(AppError::UnreadableFile).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "error": "Empty or unreadable file." }));
    }

    #[tokio::test]
    async fn test_llm_error_keeps_underlying_description() {
        let err = AppError::from(LlmError::Api {
            status: 429,
            message: "Rate limit reached".to_string(),
        });
        let (_, body) = render(err).await;
        assert_eq!(
            body["error"],
            "Error analyzing resume: API error (status 429): Rate limit reached"
        );
        assert!(body.get("analysis").is_none());
    }

    #[tokio::test]
    async fn test_panic_payload_renders_as_error_body() {
        let response = panic_response(Box::new("index out of bounds"));
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "error": "Error analyzing resume: handler panicked: index out of bounds" })
        );
    }

    #[tokio::test]
    async fn test_non_string_panic_payload() {
        let response = panic_response(Box::new(42_u32));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Error analyzing resume: handler panicked: unknown panic");
    }

    #[test]
    fn test_extraction_errors_map_to_app_errors() {
        let err = AppError::from(ExtractionError::UnsupportedMediaType("image/png".into()));
        assert_eq!(
            err.to_string(),
            "Unsupported file type 'image/png'. Please upload a PDF or plain text file."
        );
        let err = AppError::from(ExtractionError::UnreadablePdf("bad xref".into()));
        assert_eq!(err.to_string(), "Could not read PDF: bad xref");
    }
}
