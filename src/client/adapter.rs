//! The single capability every provider adapter offers.

use crate::models::{GenerationRequest, Provider, ProviderError};
use async_trait::async_trait;

/// Text completion against one provider.
///
/// Implementations translate a `GenerationRequest` into their own wire shape,
/// send exactly one request and return the raw text of the first result.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider this adapter talks to.
    fn provider(&self) -> Provider;

    /// Submit one request and extract its text.
    async fn submit(&self, request: &GenerationRequest) -> Result<String, ProviderError>;
}
