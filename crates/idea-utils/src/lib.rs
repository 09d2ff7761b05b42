//! Shared utilities for idea-rs
//!
//! Logging setup and environment-driven settings used by the binaries.

pub mod config;
pub mod logging;

pub use config::{ConfigError, LogFormat, Settings};
pub use logging::init_tracing_with;
