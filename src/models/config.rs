//! Configuration models for experimentkit.
//!
//! Everything has a default, so running without a config file is valid.
//! A TOML file only overrides what it names.

use crate::models::Provider;
use crate::pipeline::Stage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Per-provider connection settings
    #[serde(default)]
    pub providers: ProvidersConfig,

    /// Pipeline defaults
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

/// Connection settings for each provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub openai: ProviderConfig,

    #[serde(default)]
    pub anthropic: ProviderConfig,

    #[serde(default)]
    pub mistral: ProviderConfig,
}

impl ProvidersConfig {
    pub fn get(&self, provider: Provider) -> &ProviderConfig {
        match provider {
            Provider::OpenAi => &self.openai,
            Provider::Anthropic => &self.anthropic,
            Provider::Mistral => &self.mistral,
        }
    }
}

/// Settings for a single provider endpoint.
///
/// Unset fields fall back to the provider's published defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Explicit API key; `${VAR}` placeholders are expanded
    #[serde(default)]
    pub api_key: Option<String>,

    /// Environment variable consulted when `api_key` is unset
    #[serde(default)]
    pub api_key_env: Option<String>,

    /// Base URL override (e.g. a proxy or compatible gateway)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds, enforced by the HTTP client
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    180
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ProviderConfig {
    pub fn api_key_env(&self, provider: Provider) -> &str {
        self.api_key_env.as_deref().unwrap_or(provider.env_var())
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or(provider.default_base_url())
            .trim_end_matches('/')
    }
}

/// Pipeline defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Provider selector; validated when the first call is made
    #[serde(default = "default_provider")]
    pub provider: String,

    /// Model identifier (default: the provider's default model)
    #[serde(default)]
    pub model: Option<String>,

    /// Per-stage overrides
    #[serde(default)]
    pub stages: StagesConfig,
}

fn default_provider() -> String {
    Provider::OpenAi.as_str().to_string()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: None,
            stages: StagesConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Model to use for `provider`, given an optional override.
    ///
    /// Order: override, then `pipeline.model`, then the provider default.
    pub fn resolve_model(&self, provider: &str, model_override: Option<&str>) -> String {
        if let Some(model) = model_override.or(self.model.as_deref()) {
            return model.to_string();
        }
        provider
            .parse::<Provider>()
            .unwrap_or(Provider::OpenAi)
            .default_model()
            .to_string()
    }
}

/// Overrides for each stage.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StagesConfig {
    #[serde(default)]
    pub refiner: StageConfig,

    #[serde(default)]
    pub analyzer: StageConfig,

    #[serde(default)]
    pub reviser: StageConfig,
}

impl StagesConfig {
    pub fn get(&self, stage: Stage) -> &StageConfig {
        match stage {
            Stage::Refiner => &self.refiner,
            Stage::Analyzer => &self.analyzer,
            Stage::Reviser => &self.reviser,
        }
    }
}

/// Generation overrides for one stage. Unset fields use the stage defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageConfig {
    #[serde(default)]
    pub model: Option<String>,

    #[serde(default)]
    pub max_tokens: Option<u32>,

    #[serde(default)]
    pub temperature: Option<f64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_owned(),
            source: e,
        })?;

        Self::from_toml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_owned(),
            source: e,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from `path` when given, otherwise use defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

/// Expand `${VAR}` placeholders using `lookup`.
///
/// Returns the name of the first variable `lookup` cannot resolve.
pub fn expand_env_vars<F>(s: &str, lookup: F) -> Result<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let Ok(re) = regex::Regex::new(r"\$\{([^}]+)\}") else {
        return Ok(s.to_string());
    };

    let mut result = s.to_string();
    for cap in re.captures_iter(s) {
        let var_name = &cap[1];
        let value = lookup(var_name).ok_or_else(|| var_name.to_string())?;
        result = result.replace(&cap[0], &value);
    }

    Ok(result)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}
