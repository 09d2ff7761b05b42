//! Error types for LLM operations

use std::fmt;
use thiserror::Error;

/// Result type for LLM operations
pub type Result<T> = std::result::Result<T, LLMError>;

/// Coarse classification of a failed completion call
///
/// Callers branch on this instead of matching on error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing, invalid or rejected credential
    Authentication,
    /// Transport failure: connect, timeout, broken connection
    Network,
    /// The endpoint throttled the caller
    RateLimit,
    /// The endpoint answered with something we could not interpret
    MalformedResponse,
    /// Anything else
    Unknown,
}

impl ErrorKind {
    /// Stable lowercase label, used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::Network => "network",
            Self::RateLimit => "rate_limit",
            Self::MalformedResponse => "malformed_response",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during LLM operations
#[derive(Error, Debug)]
pub enum LLMError {
    /// API request failed
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// Invalid API key or authentication failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// Invalid request
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Model not found
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// HTTP error
    #[cfg(feature = "openai")]
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Unexpected response format
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),

    /// Provider-specific error
    #[error("Provider error: {0}")]
    ProviderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

impl LLMError {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::AuthenticationFailed(_) => ErrorKind::Authentication,
            Self::RateLimitExceeded(_) => ErrorKind::RateLimit,
            Self::SerializationError(_) | Self::UnexpectedResponse(_) => {
                ErrorKind::MalformedResponse
            }
            #[cfg(feature = "openai")]
            Self::HttpError(e) => {
                if e.is_decode() {
                    ErrorKind::MalformedResponse
                } else {
                    ErrorKind::Network
                }
            }
            Self::RequestFailed(_)
            | Self::InvalidRequest(_)
            | Self::ModelNotFound(_)
            | Self::ProviderError(_)
            | Self::ConfigurationError(_) => ErrorKind::Unknown,
        }
    }

    /// The underlying failure message, without the category prefix
    pub fn detail(&self) -> String {
        match self {
            Self::RequestFailed(msg)
            | Self::AuthenticationFailed(msg)
            | Self::RateLimitExceeded(msg)
            | Self::InvalidRequest(msg)
            | Self::ModelNotFound(msg)
            | Self::UnexpectedResponse(msg)
            | Self::ProviderError(msg)
            | Self::ConfigurationError(msg) => msg.clone(),
            Self::SerializationError(e) => e.to_string(),
            #[cfg(feature = "openai")]
            Self::HttpError(e) => e.to_string(),
        }
    }
}
