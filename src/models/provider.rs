//! Provider selector.
//!
//! K_i: exactly three chat-completion vendors are supported. Anything else is
//! rejected at parse time, before credentials or transports are touched.

use crate::models::ExperimentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An LLM vendor with its own chat-completion request/response shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// OpenAI-style chat completions (system message inline).
    OpenAi,
    /// Anthropic-style messages API (system text as a top-level field).
    Anthropic,
    /// Mistral-style chat completions (same framing as OpenAI).
    Mistral,
}

impl Provider {
    /// Every supported provider, in canonical order.
    pub const ALL: [Provider; 3] = [Provider::OpenAi, Provider::Anthropic, Provider::Mistral];

    /// Lowercase selector name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Anthropic => "anthropic",
            Provider::Mistral => "mistral",
        }
    }

    /// Environment variable holding this provider's API key.
    pub fn env_var(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Anthropic => "ANTHROPIC_API_KEY",
            Provider::Mistral => "MISTRAL_API_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Anthropic => "https://api.anthropic.com/v1",
            Provider::Mistral => "https://api.mistral.ai/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o-mini",
            Provider::Anthropic => "claude-3-haiku-20240307",
            Provider::Mistral => "mistral-small-latest",
        }
    }

    /// Cargo feature gating the adapter, if it is optional.
    pub fn feature(&self) -> Option<&'static str> {
        match self {
            Provider::OpenAi => None,
            Provider::Anthropic => Some("anthropic"),
            Provider::Mistral => Some("mistral"),
        }
    }

    /// Whether the adapter for this provider was compiled in.
    pub fn is_available(&self) -> bool {
        match self {
            Provider::OpenAi => true,
            Provider::Anthropic => cfg!(feature = "anthropic"),
            Provider::Mistral => cfg!(feature = "mistral"),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = ExperimentError;

    /// Case-insensitive; surrounding whitespace is ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "anthropic" => Ok(Provider::Anthropic),
            "mistral" => Ok(Provider::Mistral),
            _ => Err(ExperimentError::UnsupportedProvider(s.to_string())),
        }
    }
}
