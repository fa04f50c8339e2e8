//! Text extraction — turns an uploaded résumé (PDF or plain text) into a string.
//!
//! Extraction is synchronous and purely in-memory. Nothing here decides whether
//! the result is "readable"; callers treat an empty/whitespace string as such.

use std::panic::{self, AssertUnwindSafe};

use bytes::Bytes;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("could not parse PDF: {0}")]
    UnreadablePdf(String),
}

/// The two upload formats the analyzer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Pdf,
    PlainText,
}

impl MediaType {
    /// Parses a declared MIME type, ignoring parameters such as `; charset=utf-8`.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim();
        if essence.eq_ignore_ascii_case("application/pdf") {
            Some(MediaType::Pdf)
        } else if essence.eq_ignore_ascii_case("text/plain") {
            Some(MediaType::PlainText)
        } else {
            None
        }
    }

    /// Same as [`MediaType::from_mime`] but with the rejection as an error.
    pub fn require(mime: &str) -> Result<Self, ExtractionError> {
        Self::from_mime(mime).ok_or_else(|| ExtractionError::UnsupportedMediaType(mime.to_string()))
    }
}

/// A file received on a multipart upload. Owned by the request that received it.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub content: Bytes,
    pub media_type: String,
    pub file_name: String,
}

impl UploadedDocument {
    pub fn new(content: Bytes, media_type: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            content,
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }
}

/// Extracts text from an uploaded document according to its declared media type.
pub fn extract_text(document: &UploadedDocument) -> Result<String, ExtractionError> {
    match MediaType::require(&document.media_type)? {
        MediaType::Pdf => extract_pdf(&document.content),
        MediaType::PlainText => Ok(decode_text(&document.content)),
    }
}

/// Joins the text of every page that yields any, one newline after each page.
/// Pages with no extractable text are skipped.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractionError> {
    // pdf-extract panics on some malformed inputs instead of returning an error.
    let pages = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(bytes)
    }))
    .map_err(|_| ExtractionError::UnreadablePdf("PDF parser aborted".to_string()))?
    .map_err(|e| ExtractionError::UnreadablePdf(e.to_string()))?;

    let page_count = pages.len();
    let mut text = String::new();
    for (index, page) in pages.into_iter().enumerate() {
        if page.trim().is_empty() {
            debug!(page = index + 1, "Skipping PDF page without text");
            continue;
        }
        text.push_str(&page);
        text.push('\n');
    }

    if text.is_empty() {
        warn!(page_count, "PDF contained no extractable text");
    }
    Ok(text)
}

/// UTF-8 when valid, Latin-1 otherwise. Never fails.
pub fn decode_text(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            debug!(valid_up_to = e.valid_up_to(), "Upload is not UTF-8, decoding as Latin-1");
            bytes.iter().map(|&b| char::from(b)).collect()
        }
    }
}
