//! Completion provider trait definition

use crate::{CompletionRequest, CompletionResponse, Result};
use async_trait::async_trait;

/// Capability to turn a [`CompletionRequest`] into a [`CompletionResponse`]
///
/// Implementations wrap a concrete chat-completion service (OpenAI or any
/// OpenAI-compatible endpoint) or act as test doubles. Each call is
/// independent; implementations must not keep conversation state.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generate a completion
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    /// Get the provider name (e.g. "openai")
    fn name(&self) -> &str;
}
