//! Provider client registry.
//!
//! Builds at most one adapter per provider and hands out shared handles.
//! The registry is an explicit object: construct one at startup and share it
//! as `Arc<ClientRegistry>`. Tests build their own with injected credentials
//! and factories, so no state leaks between them.
//!
//! Concurrency: first-time construction is check-then-insert without a lock.
//! Two callers racing on the same provider may both build an adapter; the
//! first insert wins and both receive it. Construction is deterministic for a
//! given credential, so the race is benign.

use crate::client::ChatProvider;
use crate::models::{
    ExperimentError, Provider, ProviderConfig, ProvidersConfig, Result, expand_env_vars,
};
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

/// Where API keys come from.
pub trait CredentialSource: Send + Sync {
    /// Value of `var`, or `None` when unset or empty.
    fn lookup(&self, var: &str) -> Option<String>;
}

/// Reads credentials from the process environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        std::env::var(var).ok().filter(|v| !v.trim().is_empty())
    }
}

/// Builds a concrete adapter once the credential is known.
pub trait ProviderFactory: Send + Sync {
    fn build(
        &self,
        provider: Provider,
        api_key: String,
        settings: &ProviderConfig,
    ) -> Result<Arc<dyn ChatProvider>>;
}

/// Builds the reqwest-backed adapters compiled into this binary.
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpProviderFactory;

impl ProviderFactory for HttpProviderFactory {
    fn build(
        &self,
        provider: Provider,
        api_key: String,
        settings: &ProviderConfig,
    ) -> Result<Arc<dyn ChatProvider>> {
        let upstream = |e| ExperimentError::upstream(provider, e);

        match provider {
            Provider::OpenAi => Ok(Arc::new(
                crate::client::OpenAiClient::new(api_key, settings).map_err(upstream)?,
            )),
            #[cfg(feature = "anthropic")]
            Provider::Anthropic => Ok(Arc::new(
                crate::client::AnthropicClient::new(api_key, settings).map_err(upstream)?,
            )),
            #[cfg(feature = "mistral")]
            Provider::Mistral => Ok(Arc::new(
                crate::client::MistralClient::new(api_key, settings).map_err(upstream)?,
            )),
            #[allow(unreachable_patterns)]
            other => Err(unavailable(other)),
        }
    }
}

fn unavailable(provider: Provider) -> ExperimentError {
    ExperimentError::ProviderUnavailable {
        provider,
        feature: provider.feature().unwrap_or("default"),
    }
}

/// Registry of provider clients, one slot per provider.
pub struct ClientRegistry {
    settings: ProvidersConfig,
    credentials: Arc<dyn CredentialSource>,
    factory: Arc<dyn ProviderFactory>,
    clients: DashMap<Provider, Arc<dyn ChatProvider>>,
}

impl ClientRegistry {
    /// Registry reading the process environment and building HTTP adapters.
    pub fn new(settings: ProvidersConfig) -> Self {
        Self::with_parts(
            settings,
            Arc::new(EnvCredentials),
            Arc::new(HttpProviderFactory),
        )
    }

    pub fn with_parts(
        settings: ProvidersConfig,
        credentials: Arc<dyn CredentialSource>,
        factory: Arc<dyn ProviderFactory>,
    ) -> Self {
        Self {
            settings,
            credentials,
            factory,
            clients: DashMap::new(),
        }
    }

    /// Client for a provider selector such as `"OpenAI"`.
    ///
    /// Unknown selectors fail before any credential lookup.
    pub fn get_client(&self, provider: &str) -> Result<Arc<dyn ChatProvider>> {
        let provider: Provider = provider.parse()?;
        self.client(provider)
    }

    /// Client for `provider`, built on first use and cached afterwards.
    pub fn client(&self, provider: Provider) -> Result<Arc<dyn ChatProvider>> {
        if let Some(client) = self.clients.get(&provider) {
            return Ok(Arc::clone(client.value()));
        }

        if !provider.is_available() {
            return Err(unavailable(provider));
        }

        let settings = self.settings.get(provider);
        let api_key = self.resolve_api_key(provider, settings)?;
        let client = self.factory.build(provider, api_key, settings)?;
        debug!(provider = %provider, "Constructed provider client");

        // Benign race: a concurrent builder may have inserted first.
        let entry = self.clients.entry(provider).or_insert(client);
        Ok(Arc::clone(entry.value()))
    }

    /// Whether a client for `provider` has been constructed.
    pub fn is_cached(&self, provider: Provider) -> bool {
        self.clients.contains_key(&provider)
    }

    fn resolve_api_key(&self, provider: Provider, settings: &ProviderConfig) -> Result<String> {
        // Explicit key in config wins over the environment
        if let Some(key) = &settings.api_key {
            let key = expand_env_vars(key, |var| self.credentials.lookup(var)).map_err(
                |env_var| ExperimentError::MissingCredential { provider, env_var },
            )?;
            if !key.trim().is_empty() {
                return Ok(key);
            }
        }

        let env_var = settings.api_key_env(provider);
        self.credentials
            .lookup(env_var)
            .ok_or_else(|| ExperimentError::MissingCredential {
                provider,
                env_var: env_var.to_string(),
            })
    }
}
