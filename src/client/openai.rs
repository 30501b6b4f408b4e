//! OpenAI chat completions adapter.

use crate::client::chat::{ChatCompletionRequest, ChatCompletionResponse};
use crate::client::http::{HttpTransport, bearer_headers};
use crate::client::ChatProvider;
use crate::models::{GenerationRequest, Provider, ProviderConfig, ProviderError};
use async_trait::async_trait;

/// Client for `POST {base}/chat/completions` on the OpenAI API.
pub struct OpenAiClient {
    transport: HttpTransport,
    api_key: String,
    url: String,
}

impl OpenAiClient {
    pub fn new(api_key: String, settings: &ProviderConfig) -> Result<Self, ProviderError> {
        Ok(Self {
            transport: HttpTransport::new(settings.timeout_secs)?,
            api_key,
            url: format!("{}/chat/completions", settings.base_url(Provider::OpenAi)),
        })
    }

    /// Wire payload: optional system message first, input messages unchanged.
    pub fn build_payload(request: &GenerationRequest) -> ChatCompletionRequest {
        ChatCompletionRequest::from_request(request)
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::OpenAi
    }

    async fn submit(&self, request: &GenerationRequest) -> Result<String, ProviderError> {
        let payload = Self::build_payload(request);
        let body: ChatCompletionResponse = self
            .transport
            .post_json(&self.url, bearer_headers(&self.api_key)?, &payload, &request.model)
            .await?;
        body.into_text()
    }
}
