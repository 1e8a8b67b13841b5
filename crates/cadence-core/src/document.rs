//! The document-extraction boundary.
//!
//! Uploaded onboarding and past-posts documents become opaque context
//! strings. Extraction itself is a black box behind [`DocumentExtractor`];
//! a failure is per-file and never halts the other file's processing.

use thiserror::Error;

/// 10 MiB cap on uploaded documents.
pub const MAX_DOCUMENT_BYTES: usize = 10 * 1024 * 1024;

/// Errors from text extraction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document is empty")]
    Empty,
    #[error("document exceeds the {limit} byte limit")]
    TooLarge { limit: usize },
    #[error("document could not be read: {0}")]
    Unreadable(String),
}

/// Given a binary file, return extracted text or fail.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

/// Extractor for plain-text documents: UTF-8 with lossy fallback.
#[derive(Debug, Default)]
pub struct PlainTextExtractor;

impl DocumentExtractor for PlainTextExtractor {
    fn extract(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        if bytes.is_empty() {
            return Err(ExtractError::Empty);
        }
        if bytes.len() > MAX_DOCUMENT_BYTES {
            return Err(ExtractError::TooLarge { limit: MAX_DOCUMENT_BYTES });
        }
        let text = String::from_utf8_lossy(bytes).into_owned();
        if text.trim().is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}
