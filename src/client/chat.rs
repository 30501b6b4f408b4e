//! OpenAI-style chat completion wire types.
//!
//! Shared by the OpenAI and Mistral adapters, which frame messages the same
//! way: optional system message first, then the input messages in order.

use crate::models::{GenerationRequest, Message, ProviderError};
use serde::{Deserialize, Serialize};

/// Chat completion request payload.
#[derive(Debug, Clone, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl ChatCompletionRequest {
    /// Prepend the system message (if any) and pass every input role through.
    pub fn from_request(request: &GenerationRequest) -> Self {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_message.as_deref().filter(|s| !s.is_empty()) {
            messages.push(Message::system(system));
        }
        messages.extend(request.messages.iter().cloned());

        Self {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

/// Chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// Content of the first choice.
    pub fn into_text(self) -> Result<String, ProviderError> {
        self.choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::InvalidResponse("No choices in response".to_string()))?
            .message
            .content
            .ok_or_else(|| ProviderError::InvalidResponse("First choice has no content".to_string()))
    }
}
