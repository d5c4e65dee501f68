//! Error types for the prerender engine.
//!
//! Nothing here is ever surfaced to a shopper. Components propagate these
//! with `?` and the fault-isolation boundaries (bootstrap, hover handling,
//! mutation callbacks, activation monitoring) log them and carry on.

use thiserror::Error;

use crate::config::PageCategory;

/// Result type for prerender engine operations.
pub type PrerenderResult<T> = Result<T, PrerenderError>;

/// Errors reported by the host document.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The host could not parse or does not support the selector.
    #[error("Invalid selector: {0}")]
    InvalidSelector(String),

    /// A page or link URL does not parse.
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),

    /// Any other host-level failure.
    #[error("Host error: {0}")]
    Host(String),
}

/// Errors in the fixed configuration table.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A category has no selectors to track.
    #[error("No selectors configured for {0} pages")]
    EmptySelectors(PageCategory),

    /// A URL exclusion glob does not compile.
    #[error("Invalid exclude glob '{pattern}': {reason}")]
    InvalidGlob { pattern: String, reason: String },
}

/// Errors that can occur while compiling or injecting rule sets.
#[derive(Debug, Error)]
pub enum PrerenderError {
    /// The host document failed a query or mutation.
    #[error("DOM error: {0}")]
    Dom(#[from] DomError),

    /// A rule document could not be serialized.
    #[error("Failed to serialize rule set: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The configuration table is invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
