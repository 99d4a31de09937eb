//! The extraction seam: text in, validated record or typed failure out

use std::time::Duration;
use thiserror::Error;

/// Why a single extraction attempt produced no record.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ExtractionFailure {
    #[error("model request failed: {0}")]
    Request(String),

    #[error("no reply within {0:?}")]
    Timeout(Duration),

    #[error("reply is not valid JSON: {0}")]
    MalformedReply(String),

    #[error("reply does not match {schema}: {detail}")]
    SchemaMismatch { schema: &'static str, detail: String },
}

/// A failed page, kept for the run report. `page` is zero-based.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("page {}: {}", .page + 1, .reason)]
pub struct PageExtractionError {
    pub page: usize,
    pub reason: ExtractionFailure,
}

/// Turns document text into a record of type `T`.
///
/// Calls block until a reply, a failure, or the implementation's timeout.
pub trait ExtractionRequester<T> {
    fn request(&self, text: &str) -> Result<T, ExtractionFailure>;
}

impl<T, F> ExtractionRequester<T> for F
where
    F: Fn(&str) -> Result<T, ExtractionFailure>,
{
    fn request(&self, text: &str) -> Result<T, ExtractionFailure> {
        self(text)
    }
}
