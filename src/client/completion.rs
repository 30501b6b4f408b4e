//! Unified completion call.
//!
//! One signature for all providers: resolve the client, hand it a
//! provider-agnostic request, return trimmed text.

use crate::client::ClientRegistry;
use crate::models::{CompletionOptions, ExperimentError, GenerationRequest, Message, Result};
use tracing::debug;

/// Send `messages` to `model` on `provider` and return the completion text.
///
/// Exactly one request is issued. The result has leading and trailing
/// whitespace removed regardless of provider. Transport failures surface as
/// `ExperimentError::Upstream` carrying the provider and the original error.
pub async fn complete(
    registry: &ClientRegistry,
    messages: Vec<Message>,
    model: &str,
    provider: &str,
    options: CompletionOptions,
) -> Result<String> {
    let client = registry.get_client(provider)?;
    let provider = client.provider();
    let request = GenerationRequest::new(model, messages, options);

    debug!(
        provider = %provider,
        model = %request.model,
        messages = request.messages.len(),
        max_tokens = request.max_tokens,
        temperature = request.temperature,
        "Dispatching completion"
    );

    let text = client
        .submit(&request)
        .await
        .map_err(|e| ExperimentError::upstream(provider, e))?;

    Ok(text.trim().to_string())
}
