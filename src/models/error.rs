//! Error types for experimentkit.
//!
//! Taxonomy:
//! - Caller mistakes: unsupported provider, missing credential, bad input
//! - Build-time gaps: provider adapter compiled out
//! - Upstream failures: anything the provider transport reports

use crate::models::{ConfigError, Provider};
use std::time::Duration;
use thiserror::Error;

/// Top-level error type for experimentkit.
///
/// Every variant is fatal for the current run. Nothing is retried.
#[derive(Debug, Error)]
pub enum ExperimentError {
    // ═══════════════════════════════════════════════════════════════════
    // SETUP — rejected before any request is sent
    // ═══════════════════════════════════════════════════════════════════

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Unsupported provider: '{0}' (supported: openai, anthropic, mistral)")]
    UnsupportedProvider(String),

    #[error("Missing API key for provider '{provider}': set the {env_var} environment variable")]
    MissingCredential { provider: Provider, env_var: String },

    #[error(
        "Provider '{provider}' is unavailable: this build lacks the `{feature}` feature"
    )]
    ProviderUnavailable {
        provider: Provider,
        feature: &'static str,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // ═══════════════════════════════════════════════════════════════════
    // UPSTREAM — the provider call itself failed
    // ═══════════════════════════════════════════════════════════════════

    #[error("{provider} request failed: {source}")]
    Upstream {
        provider: Provider,
        #[source]
        source: ProviderError,
    },
}

/// Failure reported by a provider transport.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("authentication failed: invalid API key")]
    AuthenticationFailed,

    #[error("model not found: {0}")]
    ModelNotFound(String),

    #[error("rate limited: {message}")]
    RateLimited {
        message: String,
        retry_after_secs: Option<f64>,
    },

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("request timeout after {0:?}")]
    Timeout(Duration),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("invalid header value for {0}")]
    InvalidHeader(&'static str),

    #[error("transport error: {0}")]
    Transport(String),
}

impl ExperimentError {
    /// Create an IO error with context.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Wrap a transport failure with the provider it came from.
    pub fn upstream(provider: Provider, source: ProviderError) -> Self {
        Self::Upstream { provider, source }
    }

    /// Provider the error is attributed to, if any.
    pub fn provider(&self) -> Option<Provider> {
        match self {
            Self::MissingCredential { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::Upstream { provider, .. } => Some(*provider),
            _ => None,
        }
    }
}

/// Result type alias for experimentkit.
pub type Result<T> = std::result::Result<T, ExperimentError>;
