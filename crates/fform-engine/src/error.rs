#![forbid(unsafe_code)]

//! Submission errors.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// An error reported by a submit handler.
///
/// Cheap to clone so it can ride along in every [`FormSnapshot`](crate::FormSnapshot).
#[derive(Debug, Clone)]
pub struct SubmissionError {
    kind: SubmissionErrorKind,
    message: String,
    source: Option<Arc<dyn Error + Send + Sync>>,
}

/// Broad classification of a [`SubmissionError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionErrorKind {
    /// The handler reported a failure.
    Handler,
    /// The pending submission was dropped before the handler finished.
    Cancelled,
}

impl SubmissionError {
    /// A handler failure with a message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            kind: SubmissionErrorKind::Handler,
            message: message.into(),
            source: None,
        }
    }

    /// Wrap an underlying error, using its `Display` output as the message.
    #[must_use]
    pub fn from_error(err: impl Error + Send + Sync + 'static) -> Self {
        Self {
            kind: SubmissionErrorKind::Handler,
            message: err.to_string(),
            source: Some(Arc::new(err)),
        }
    }

    /// The error recorded when a pending submission is dropped.
    #[must_use]
    pub fn cancelled() -> Self {
        Self {
            kind: SubmissionErrorKind::Cancelled,
            message: "submission cancelled".to_string(),
            source: None,
        }
    }

    /// Error classification.
    #[must_use]
    pub fn kind(&self) -> SubmissionErrorKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the submission was cancelled rather than failed.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.kind == SubmissionErrorKind::Cancelled
    }
}

impl PartialEq for SubmissionError {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.message == other.message
    }
}

impl Eq for SubmissionError {}

impl fmt::Display for SubmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl Error for SubmissionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.source
            .as_deref()
            .map(|err| err as &(dyn Error + 'static))
    }
}
