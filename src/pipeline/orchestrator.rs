//! Refine → analyze → revise, in sequence.
//!
//! Pipeline flow:
//! Hypothesis → Refiner → refined → Analyzer → critique → Reviser(refined, critique) → revised

use crate::client::ClientRegistry;
use crate::models::{Config, PipelineRun, Result};
use crate::pipeline::StageRunner;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// Hypothesis refinement pipeline.
///
/// Holds no per-run state, so one instance can serve many runs.
#[derive(Clone)]
pub struct HypothesisPipeline {
    stages: StageRunner,
}

impl HypothesisPipeline {
    pub fn new(stages: StageRunner) -> Self {
        Self { stages }
    }

    /// Build from configuration with optional provider/model overrides.
    pub fn from_config(
        config: &Config,
        registry: Arc<ClientRegistry>,
        provider: Option<&str>,
        model: Option<&str>,
    ) -> Self {
        let provider = provider.unwrap_or(&config.pipeline.provider);
        let model = config.pipeline.resolve_model(provider, model);
        Self::new(StageRunner::new(
            registry,
            provider,
            model,
            config.pipeline.stages.clone(),
        ))
    }

    /// Stage runner, for invoking single stages.
    pub fn stages(&self) -> &StageRunner {
        &self.stages
    }

    /// Run all three stages. Any failure aborts the run; nothing partial is returned.
    pub async fn run(&self, hypothesis: &str) -> Result<PipelineRun> {
        let start = Instant::now();
        info!(
            provider = %self.stages.provider(),
            model = %self.stages.model(),
            "Starting hypothesis pipeline"
        );

        let refined = self.stages.refine(hypothesis).await?;
        let critique = self.stages.analyze(&refined).await?;
        let revised = self.stages.revise(&refined, &critique).await?;

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Hypothesis pipeline complete"
        );

        Ok(PipelineRun {
            original: hypothesis.to_string(),
            refined,
            critique,
            revised,
        })
    }
}
