//! LLM client module.
//!
//! - `ClientRegistry`: one cached adapter per provider
//! - `complete`: the provider-agnostic completion call
//! - Adapters: OpenAI (always), Anthropic and Mistral (cargo features)

mod adapter;
mod chat;
mod completion;
mod http;
mod openai;
mod registry;

#[cfg(feature = "anthropic")]
mod anthropic;
#[cfg(feature = "mistral")]
mod mistral;

pub use adapter::*;
pub use chat::{ChatCompletionRequest, ChatCompletionResponse};
pub use completion::*;
pub use http::HttpTransport;
pub use openai::*;
pub use registry::*;

#[cfg(feature = "anthropic")]
pub use anthropic::*;
#[cfg(feature = "mistral")]
pub use mistral::*;
