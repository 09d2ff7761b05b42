//! Settings read from the process environment

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Base URL of the chat-completions API
pub const API_BASE_ENV: &str = "OPENAI_API_BASE";
/// Model override
pub const MODEL_ENV: &str = "IDEA_MODEL";
/// Request timeout in seconds
pub const TIMEOUT_ENV: &str = "IDEA_TIMEOUT_SECS";
/// `text` or `json`
pub const LOG_FORMAT_ENV: &str = "IDEA_LOG_FORMAT";

/// Errors raised while reading settings
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A variable is set but cannot be parsed
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    InvalidValue {
        /// Variable name
        name: &'static str,
        /// Raw value
        value: String,
        /// What was expected
        reason: String,
    },
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("expected 'text' or 'json', got '{other}'")),
        }
    }
}

/// Environment settings
///
/// Unset values stay `None` so callers can apply their own defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// API base URL
    pub api_base: Option<String>,
    /// Model name
    pub model: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Log output format
    pub log_format: LogFormat,
}

impl Settings {
    /// Read settings through an environment lookup
    ///
    /// Binaries pass `|name| std::env::var(name).ok()`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout_secs = get(TIMEOUT_ENV)
            .map(|value| {
                value
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        name: TIMEOUT_ENV,
                        value: value.clone(),
                        reason: e.to_string(),
                    })
            })
            .transpose()?;

        let log_format = get(LOG_FORMAT_ENV)
            .map(|value| {
                value.parse::<LogFormat>().map_err(|reason| ConfigError::InvalidValue {
                    name: LOG_FORMAT_ENV,
                    value: value.clone(),
                    reason,
                })
            })
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api_base: get(API_BASE_ENV),
            model: get(MODEL_ENV),
            timeout_secs,
            log_format,
        })
    }
}
