//! API credential resolution

use std::fmt;

/// Environment variable consulted when no key is passed explicitly
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// An API key
///
/// The value never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    /// Wrap a key
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Resolve a key: the explicit value wins, otherwise `OPENAI_API_KEY`
    ///
    /// Empty strings count as absent. Returns `None` when neither source
    /// yields a key.
    pub fn resolve(explicit: Option<String>) -> Option<Self> {
        Self::resolve_with(explicit, |name| std::env::var(name).ok())
    }

    /// Same as [`Credential::resolve`] with a custom environment lookup
    pub fn resolve_with<F>(explicit: Option<String>, lookup: F) -> Option<Self>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        explicit
            .filter(|key| !key.is_empty())
            .or_else(|| lookup(API_KEY_ENV).filter(|key| !key.is_empty()))
            .map(Self)
    }

    /// The raw key, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}
