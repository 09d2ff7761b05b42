//! Chat-completion provider abstraction for idea-rs
//!
//! This crate provides provider-agnostic types for talking to a
//! chat-completion service:
//!
//! - Role-tagged message types
//! - Completion request/response types
//! - The `CompletionProvider` capability trait
//! - Typed errors with a coarse `ErrorKind` classification
//! - An OpenAI-compatible provider (behind the `openai` feature)

pub mod completion;
pub mod credential;
pub mod error;
pub mod messages;
pub mod provider;

// Re-export main types
pub use completion::{CompletionRequest, CompletionResponse, StopReason, TokenUsage};
pub use credential::{API_KEY_ENV, Credential};
pub use error::{ErrorKind, LLMError, Result};
pub use messages::{Message, Role};
pub use provider::CompletionProvider;

// Provider implementations (feature-gated)
#[cfg(feature = "openai")]
pub mod providers;
