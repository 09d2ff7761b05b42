//! Concrete provider implementations
//!
//! This module contains implementations of the CompletionProvider trait for
//! chat-completion services.

pub mod openai;

pub use openai::{OpenAIConfig, OpenAIProvider};
