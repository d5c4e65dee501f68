//! CLI error type.

use shopfront_prerender::{ConfigError, PrerenderError};
use thiserror::Error;

/// Errors reported by CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("{0}")]
    Prerender(#[from] PrerenderError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to render JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("None of the {0} URL(s) given is eligible for prerendering")]
    NoEligibleUrls(usize),
}
