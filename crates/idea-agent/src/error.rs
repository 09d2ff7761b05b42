//! Error types for idea generation

use idea_llm::{ErrorKind, LLMError};
use thiserror::Error;

/// Result type alias for idea generation
pub type Result<T> = std::result::Result<T, IdeaError>;

/// Marker that prefixes the degraded string form of an [`IdeaError`]
pub const ERROR_MARKER: &str = "[ERROR]";

/// A failed idea generation
///
/// `kind` is meant for branching; `detail` keeps the original failure
/// message and is what ends up in the degraded string form.
#[derive(Error, Debug)]
#[error("Failed to generate idea: {detail}")]
pub struct IdeaError {
    kind: ErrorKind,
    detail: String,
    #[source]
    source: Option<LLMError>,
}

impl IdeaError {
    /// The completion came back without any text
    pub(crate) fn empty_completion() -> Self {
        Self {
            kind: ErrorKind::MalformedResponse,
            detail: "completion contained no text".to_string(),
            source: None,
        }
    }

    /// Failure category
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Original failure message
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// `"[ERROR] Failed to generate idea: <detail>"`
    pub fn to_marked_string(&self) -> String {
        format!("{ERROR_MARKER} {self}")
    }
}

impl From<LLMError> for IdeaError {
    fn from(err: LLMError) -> Self {
        Self {
            kind: err.kind(),
            detail: err.detail(),
            source: Some(err),
        }
    }
}
