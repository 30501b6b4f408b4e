//! Test doubles for the client layer.
//!
//! `ScriptedFactory` hands out `ScriptedProvider`s that answer from a closure
//! and record every request; `CountingCredentials` serves fixed keys and
//! counts lookups.

use crate::client::{ChatProvider, CredentialSource, ProviderFactory};
use crate::models::{GenerationRequest, Provider, ProviderConfig, ProviderError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Responder =
    dyn Fn(Provider, &GenerationRequest) -> std::result::Result<String, ProviderError> + Send + Sync;

/// Fixed credentials with per-variable lookup counts.
pub struct CountingCredentials {
    values: HashMap<String, String>,
    counts: Mutex<HashMap<String, usize>>,
}

impl CountingCredentials {
    pub fn with(values: &[(&str, &str)]) -> Self {
        Self {
            values: values
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            counts: Mutex::new(HashMap::new()),
        }
    }

    pub fn lookups(&self, var: &str) -> usize {
        self.counts.lock().unwrap().get(var).copied().unwrap_or(0)
    }

    pub fn total_lookups(&self) -> usize {
        self.counts.lock().unwrap().values().sum()
    }
}

impl CredentialSource for CountingCredentials {
    fn lookup(&self, var: &str) -> Option<String> {
        *self
            .counts
            .lock()
            .unwrap()
            .entry(var.to_string())
            .or_default() += 1;
        self.values.get(var).cloned()
    }
}

/// Adapter answering from a closure.
pub struct ScriptedProvider {
    provider: Provider,
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn submit(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<String, ProviderError> {
        self.requests.lock().unwrap().push(request.clone());
        (self.responder)(self.provider, request)
    }
}

/// Factory producing `ScriptedProvider`s that share one request log.
pub struct ScriptedFactory {
    responder: Arc<Responder>,
    requests: Arc<Mutex<Vec<GenerationRequest>>>,
    builds: Mutex<HashMap<Provider, usize>>,
    keys: Mutex<HashMap<Provider, String>>,
}

impl ScriptedFactory {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(Provider, &GenerationRequest) -> std::result::Result<String, ProviderError>
            + Send
            + Sync
            + 'static,
    {
        Self {
            responder: Arc::new(responder),
            requests: Arc::new(Mutex::new(Vec::new())),
            builds: Mutex::new(HashMap::new()),
            keys: Mutex::new(HashMap::new()),
        }
    }

    /// Replies with the user text prefixed by the provider name.
    pub fn echo() -> Self {
        Self::new(|provider, request| Ok(format!("[{provider}] {}", request.user_text())))
    }

    /// Every request submitted through any adapter built by this factory.
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn builds(&self, provider: Provider) -> usize {
        self.builds.lock().unwrap().get(&provider).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.builds.lock().unwrap().values().sum()
    }

    pub fn last_key(&self, provider: Provider) -> Option<String> {
        self.keys.lock().unwrap().get(&provider).cloned()
    }
}

impl ProviderFactory for ScriptedFactory {
    fn build(
        &self,
        provider: Provider,
        api_key: String,
        _settings: &ProviderConfig,
    ) -> Result<Arc<dyn ChatProvider>> {
        *self.builds.lock().unwrap().entry(provider).or_default() += 1;
        self.keys.lock().unwrap().insert(provider, api_key);
        Ok(Arc::new(ScriptedProvider {
            provider,
            responder: Arc::clone(&self.responder),
            requests: Arc::clone(&self.requests),
        }))
    }
}
