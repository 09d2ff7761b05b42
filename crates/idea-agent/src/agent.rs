//! The idea agent: one prompt in, one idea out

use crate::{IdeaError, Result};
use idea_llm::providers::{OpenAIConfig, OpenAIProvider};
use idea_llm::{CompletionProvider, CompletionRequest, Credential, Message, StopReason};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Instruction sent as the system message of every request
pub const SYSTEM_PROMPT: &str = "You are a creative AI research scientist. Respond with a concrete, novel model idea or strategy for the given research goal.";

/// Model used unless configured otherwise
pub const DEFAULT_MODEL: &str = "gpt-4o";

/// High temperature favours novel phrasing over determinism
pub const DEFAULT_TEMPERATURE: f32 = 1.6;

/// Upper bound on generated tokens; longer ideas are cut off
pub const DEFAULT_MAX_TOKENS: usize = 500;

/// Sampling configuration for an [`IdeaAgent`]
#[derive(Debug, Clone, PartialEq)]
pub struct IdeaConfig {
    /// Model to use
    pub model: String,

    /// System instruction
    pub system_prompt: String,

    /// Max tokens per completion
    pub max_tokens: usize,

    /// Temperature for sampling
    pub temperature: f32,
}

impl Default for IdeaConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: SYSTEM_PROMPT.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

impl IdeaConfig {
    /// Set the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the system instruction
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Set the token limit
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set the temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// Generates research ideas from a natural-language goal
///
/// Every call is independent: the agent keeps no history and never
/// retries. The provider, and with it the credential, is fixed at
/// construction.
///
/// # Example
///
/// ```no_run
/// use idea_agent::IdeaAgent;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// // Key from OPENAI_API_KEY
/// let agent = IdeaAgent::new(None)?;
///
/// match agent.generate_idea("Beat the CIFAR-10 SOTA with under 1M parameters").await {
///     Ok(idea) => println!("{idea}"),
///     Err(e) => eprintln!("{:?}: {}", e.kind(), e.detail()),
/// }
/// # Ok(())
/// # }
/// ```
pub struct IdeaAgent {
    provider: Arc<dyn CompletionProvider>,
    config: IdeaConfig,
}

impl IdeaAgent {
    /// Create an agent backed by OpenAI
    ///
    /// `api_key` wins over `OPENAI_API_KEY`. A missing key does not fail
    /// here; it surfaces as an authentication error on the first call.
    pub fn new(api_key: Option<String>) -> idea_llm::Result<Self> {
        let openai = openai_config(OpenAIConfig::from_env(), api_key, |name| {
            std::env::var(name).ok()
        });
        Self::with_openai(openai, IdeaConfig::default())
    }

    /// Create an agent backed by an explicitly configured OpenAI provider
    pub fn with_openai(openai: OpenAIConfig, config: IdeaConfig) -> idea_llm::Result<Self> {
        let provider = OpenAIProvider::with_config(openai)?;
        Ok(Self::with_provider(Arc::new(provider), config))
    }

    /// Create an agent on top of any provider
    pub fn with_provider(provider: Arc<dyn CompletionProvider>, config: IdeaConfig) -> Self {
        Self { provider, config }
    }

    /// Get the agent's configuration
    pub fn config(&self) -> &IdeaConfig {
        &self.config
    }

    /// Ask the model for an idea
    ///
    /// Sends the system instruction and `prompt` (verbatim, unvalidated) as
    /// exactly two messages. Returns the first choice's text with
    /// surrounding whitespace trimmed.
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    pub async fn generate_idea(&self, prompt: &str) -> Result<String> {
        let request = self.build_request(prompt);
        debug!("Requesting idea");

        let response = self.provider.complete(request).await.map_err(|e| {
            let err = IdeaError::from(e);
            warn!(kind = %err.kind(), detail = err.detail(), "Idea generation failed");
            err
        })?;

        if response.stop_reason == StopReason::MaxTokens {
            warn!(
                max_tokens = self.config.max_tokens,
                "Idea was truncated at the token limit"
            );
        }

        let text = response.message.text().ok_or_else(|| {
            warn!("Completion contained no text");
            IdeaError::empty_completion()
        })?;

        Ok(text.trim().to_string())
    }

    /// Like [`IdeaAgent::generate_idea`], but failures come back as text
    ///
    /// Errors are rendered as `"[ERROR] Failed to generate idea: <detail>"`,
    /// so callers that only handle strings can inspect the prefix.
    pub async fn generate_idea_text(&self, prompt: &str) -> String {
        match self.generate_idea(prompt).await {
            Ok(idea) => idea,
            Err(e) => e.to_marked_string(),
        }
    }

    fn build_request(&self, prompt: &str) -> CompletionRequest {
        CompletionRequest::builder(&self.config.model)
            .system(self.config.system_prompt.clone())
            .add_message(Message::user(prompt))
            .max_tokens(self.config.max_tokens)
            .temperature(self.config.temperature)
            .build()
    }
}

/// Put the resolved credential into an OpenAI config
fn openai_config<F>(base: OpenAIConfig, api_key: Option<String>, lookup: F) -> OpenAIConfig
where
    F: FnOnce(&str) -> Option<String>,
{
    base.with_optional_api_key(Credential::resolve_with(api_key, lookup))
}
