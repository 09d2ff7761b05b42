//! Research idea generation for idea-rs
//!
//! [`IdeaAgent`] sends a research goal to a chat-completion provider under a
//! fixed "creative research scientist" instruction and returns the idea the
//! model comes up with. Failures are typed ([`IdeaError`]); callers that
//! want plain text use [`IdeaAgent::generate_idea_text`].

pub mod agent;
pub mod error;

pub use agent::{
    DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_TEMPERATURE, IdeaAgent, IdeaConfig, SYSTEM_PROMPT,
};
pub use error::{ERROR_MARKER, IdeaError, Result};
pub use idea_llm::ErrorKind;
