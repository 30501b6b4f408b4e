//! experimentkit - Hypothesis refinement through successive LLM calls.
//!
//! ## Architecture
//!
//! - **Client registry**: one lazily built, cached adapter per provider
//! - **Completion call**: one signature over OpenAI, Anthropic and Mistral
//! - **Stages**: Refiner, Analyzer, Reviser (prompt templates)
//! - **Pipeline**: Refiner → Analyzer → Reviser, outputs threaded forward
//!
//! ## Providers
//!
//! OpenAI is always available. Anthropic and Mistral adapters are behind the
//! `anthropic` and `mistral` cargo features (both on by default).

pub mod client;
pub mod models;
pub mod pipeline;

#[cfg(test)]
mod testing;

// Re-exports for convenience
pub use client::{ChatProvider, ClientRegistry, complete};
pub use models::{
    CompletionOptions, Config, ExperimentError, Message, PipelineRun, Provider, ProviderError,
    Result, Role,
};
pub use pipeline::{HypothesisPipeline, Stage, StageRunner};
