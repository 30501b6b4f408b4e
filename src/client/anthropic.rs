//! Anthropic messages API adapter.
//!
//! The system text travels as a top-level `system` field, never as a
//! message, so any `system` role entries in the input are dropped.

use crate::client::http::{HttpTransport, api_key_headers};
use crate::client::ChatProvider;
use crate::models::{GenerationRequest, Message, Provider, ProviderConfig, ProviderError, Role};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Messages API request payload.
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
    pub system: String,
    pub messages: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicContent>,
}

#[derive(Debug, Deserialize)]
struct AnthropicContent {
    #[serde(default)]
    text: Option<String>,
}

impl AnthropicResponse {
    /// Text of the first content block.
    fn into_text(self) -> Result<String, ProviderError> {
        self.content
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No content blocks in response".to_string()))?
            .text
            .ok_or_else(|| ProviderError::InvalidResponse("First content block has no text".to_string()))
    }
}

pub struct AnthropicClient {
    transport: HttpTransport,
    api_key: String,
    url: String,
}

impl AnthropicClient {
    pub fn new(api_key: String, settings: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: HttpTransport::new(settings.timeout_secs)?,
            api_key,
            url: format!("{}/messages", settings.base_url(Provider::Anthropic)),
        })
    }

    /// Wire payload: system text hoisted out, system-role messages removed.
    pub fn build_payload(request: &GenerationRequest) -> AnthropicRequest {
        AnthropicRequest {
            model: request.model.clone(),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system_message.clone().unwrap_or_default(),
            messages: request
                .messages
                .iter()
                .filter(|m| m.role != Role::System)
                .cloned()
                .collect(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatProvider for AnthropicClient {
    fn provider(&self) -> Provider {
        Provider::Anthropic
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let payload = Self::build_payload(request);
        let headers = api_key_headers(
            "x-api-key",
            &self.api_key,
            &[("anthropic-version", ANTHROPIC_VERSION)],
        )?;

        let body: AnthropicResponse = self
            .transport
            .post_json(&self.url, headers, &payload, &request.model)
            .await?;

        body.into_text()
    }
}
