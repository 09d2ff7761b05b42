//! OpenAI provider implementation
//!
//! This module implements the CompletionProvider trait against the OpenAI
//! chat-completions endpoint, or any server that speaks the same protocol.
//! See: https://platform.openai.com/docs/api-reference/chat
//!
//! # Examples
//!
//! ## Basic usage with environment variable
//!
//! ```no_run
//! use idea_llm::{CompletionProvider, CompletionRequest, Message};
//! use idea_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Key from OPENAI_API_KEY, base URL from OPENAI_API_BASE (optional)
//!     let provider = OpenAIProvider::with_config(OpenAIConfig::from_env())?;
//!
//!     let request = CompletionRequest::builder("gpt-4o")
//!         .system("You are terse.")
//!         .add_message(Message::user("Hello!"))
//!         .max_tokens(100)
//!         .build();
//!
//!     let response = provider.complete(request).await?;
//!     println!("{}", response.message.text().unwrap_or_default());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## OpenAI-compatible servers
//!
//! ```no_run
//! use idea_llm::providers::{OpenAIConfig, OpenAIProvider};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // llama.cpp, vLLM, LM Studio, ... usually need no key
//! let local_config = OpenAIConfig::default()
//!     .with_api_base("http://localhost:8000/v1")
//!     .with_timeout(180);
//!
//! let provider = OpenAIProvider::with_config(local_config)?;
//! # Ok(())
//! # }
//! ```

use crate::{
    CompletionProvider, CompletionRequest, CompletionResponse, Credential, LLMError, Message,
    Result, Role, StopReason, TokenUsage,
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

/// Default base URL of the OpenAI API
pub const DEFAULT_OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Configuration for OpenAI provider
#[derive(Debug, Clone)]
pub struct OpenAIConfig {
    /// API key; requests go out without an `Authorization` header when unset
    pub api_key: Option<Credential>,

    /// Base URL for the API (default: "https://api.openai.com/v1")
    pub api_base: String,

    /// Request timeout in seconds (default: 120)
    pub timeout_secs: u64,
}

impl OpenAIConfig {
    /// Create config from the environment
    ///
    /// Reads the API key from `OPENAI_API_KEY` and the base URL from
    /// `OPENAI_API_BASE`. A missing key is not an error here.
    pub fn from_env() -> Self {
        let api_base = std::env::var("OPENAI_API_BASE")
            .unwrap_or_else(|_| DEFAULT_OPENAI_API_BASE.to_string());

        Self {
            api_key: Credential::resolve(None),
            api_base,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Set the credential, or clear it
    pub fn with_optional_api_key(mut self, api_key: Option<Credential>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Set custom API base URL
    ///
    /// Useful for:
    /// - Azure OpenAI: "https://YOUR_RESOURCE.openai.azure.com/openai/deployments/YOUR_DEPLOYMENT"
    /// - Local deployments: "http://localhost:8000/v1"
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Set request timeout in seconds
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// URL of the chat-completions endpoint under `api_base`
    pub fn endpoint(&self) -> Result<Url> {
        let base = self.api_base.trim_end_matches('/');
        Url::parse(&format!("{base}/chat/completions")).map_err(|e| {
            LLMError::ConfigurationError(format!("Invalid API base '{}': {e}", self.api_base))
        })
    }
}

impl Default for OpenAIConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_OPENAI_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// OpenAI provider
///
/// Holds one reusable HTTP client and the immutable configuration.
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
    endpoint: Url,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with custom configuration
    ///
    /// Fails if the base URL does not parse or the HTTP client cannot be
    /// built. A missing credential is accepted.
    pub fn with_config(config: OpenAIConfig) -> Result<Self> {
        let endpoint = config.endpoint()?;
        if config.api_key.is_none() {
            warn!(
                api_base = %config.api_base,
                "No API key configured; requests will be sent unauthenticated"
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Get the current configuration
    pub fn config(&self) -> &OpenAIConfig {
        &self.config
    }
}

#[async_trait]
impl CompletionProvider for OpenAIProvider {
    #[instrument(skip(self, request), fields(model = %request.model, endpoint = %self.endpoint))]
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        debug!(
            messages = request.messages.len(),
            max_tokens = request.max_tokens,
            "Sending chat completion request"
        );

        let openai_request = OpenAIRequest {
            model: request.model.clone(),
            messages: convert_messages(request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let mut http_request = self
            .client
            .post(self.endpoint.as_str())
            .header("Content-Type", "application/json")
            .json(&openai_request);
        if let Some(key) = &self.config.api_key {
            http_request = http_request.bearer_auth(key.expose());
        }

        let response = http_request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(map_status_error(status, &error_text));
        }

        let openai_response: OpenAIResponse = response.json().await.map_err(|e| {
            LLMError::UnexpectedResponse(format!("Failed to parse response: {e}"))
        })?;

        // Only the first choice is used
        let choice = openai_response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LLMError::UnexpectedResponse("No choices in response".to_string()))?;

        let usage = openai_response.usage.map_or_else(TokenUsage::default, |u| TokenUsage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
        });
        let stop_reason = map_stop_reason(choice.finish_reason.as_deref());

        debug!(
            ?stop_reason,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            total_tokens = usage.total(),
            "Received chat completion"
        );

        Ok(CompletionResponse {
            message: Message {
                role: Role::Assistant,
                content: choice.message.content,
            },
            stop_reason,
            usage,
        })
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

// ============================================================================
// OpenAI-specific request types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    max_tokens: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage {
    role: &'static str,
    content: String,
}

// ============================================================================
// OpenAI-specific response types
// ============================================================================

#[derive(Debug, Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
    #[serde(default)]
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: usize,
    completion_tokens: usize,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorEnvelope {
    error: OpenAIErrorBody,
}

#[derive(Debug, Deserialize)]
struct OpenAIErrorBody {
    message: String,
}

// ============================================================================
// Conversion functions
// ============================================================================

/// Convert our messages to the wire format, preserving order
fn convert_messages(messages: Vec<Message>) -> Vec<OpenAIMessage> {
    messages
        .into_iter()
        .map(|msg| OpenAIMessage {
            role: msg.role.as_str(),
            content: msg.content.unwrap_or_default(),
        })
        .collect()
}

/// Pull `error.message` out of an OpenAI error body, falling back to the raw body
fn api_error_message(body: &str) -> String {
    serde_json::from_str::<OpenAIErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// Map a non-success HTTP status to an error
fn map_status_error(status: StatusCode, body: &str) -> LLMError {
    let message = api_error_message(body);
    match status.as_u16() {
        401 | 403 => LLMError::AuthenticationFailed(message),
        429 => LLMError::RateLimitExceeded(message),
        400 => LLMError::InvalidRequest(message),
        404 => LLMError::ModelNotFound(message),
        _ => LLMError::RequestFailed(format!("HTTP {status}: {message}")),
    }
}

/// Map OpenAI finish reason to our format
fn map_stop_reason(reason: Option<&str>) -> StopReason {
    match reason {
        Some("stop") | None => StopReason::EndTurn,
        Some("length") => StopReason::MaxTokens,
        Some("content_filter") => {
            debug!("Content filtered by OpenAI safety systems");
            StopReason::ContentFilter
        }
        Some(other) => {
            debug!("Unknown stop reason: {}", other);
            StopReason::EndTurn
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
