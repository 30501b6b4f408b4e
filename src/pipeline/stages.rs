//! The three prompt-templated stages.
//!
//! Each stage fills one fixed template, calls the completion layer with its
//! own system framing and generation parameters, and returns the text as-is.
//! What the prompt asks for (one sentence, 3–5 paragraphs, ...) is advisory;
//! the output is never parsed or validated.

use crate::client::{ClientRegistry, complete};
use crate::models::{CompletionOptions, Message, Result, StagesConfig};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// A step in the hypothesis pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Rewrites the hypothesis to be specific and falsifiable
    Refiner,
    /// Peer-reviews the refined hypothesis
    Analyzer,
    /// Folds the review back into a revised hypothesis
    Reviser,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Refiner => "refiner",
            Stage::Analyzer => "analyzer",
            Stage::Reviser => "reviser",
        }
    }

    pub fn system_message(&self) -> &'static str {
        match self {
            Stage::Refiner => "You are a helpful experiment design assistant.",
            Stage::Analyzer => "You are a thoughtful and critical experiment design reviewer.",
            Stage::Reviser => "You are a precise experiment improvement agent.",
        }
    }

    pub fn default_max_tokens(&self) -> u32 {
        match self {
            Stage::Refiner => 250,
            Stage::Analyzer => 400,
            Stage::Reviser => 250,
        }
    }

    pub fn default_temperature(&self) -> f64 {
        match self {
            Stage::Refiner => 0.7,
            Stage::Analyzer => 0.6,
            Stage::Reviser => 0.7,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub fn refiner_prompt(hypothesis: &str) -> String {
    format!(
        r#"You are a Hypothesis Refinement Agent.

Task:
Given the following hypothesis, rewrite it to make it more specific,
measurable, and testable. Use clear metrics or conditions where possible.

Original hypothesis:
"{hypothesis}"

Output:
A single refined hypothesis that is concrete, falsifiable, and written
in one or two sentences."#
    )
}

pub fn analyzer_prompt(refined: &str) -> String {
    format!(
        r#"You are a Hypothesis Reflection Agent.

Task:
Critically evaluate the following refined hypothesis as if you are a peer reviewer
preparing it for a real-world experiment.

Refined hypothesis:
"{refined}"

Analyze it on the following criteria:
1. **Clarity** – Is the hypothesis clearly stated and easy to understand?
2. **Specificity** – Does it define measurable metrics, timeframes, or success conditions?
3. **Testability** – Could it realistically be validated or falsified with an experiment?
4. **Assumptions** – Are there any hidden assumptions or biases?
5. **Actionability** – Can it guide a meaningful next experiment?

Output:
Provide a short, structured reflection in 3–5 paragraphs that includes:
- A summary of the hypothesis quality
- Two concrete strengths
- Two areas to improve
- One actionable suggestion for refinement or next steps."#
    )
}

pub fn reviser_prompt(refined: &str, critique: &str) -> String {
    format!(
        r#"You are a Hypothesis Revision Agent.

Original hypothesis:
"{refined}"

Reflection feedback:
"{critique}"

Task:
Produce one revised hypothesis that integrates the reflection feedback
while remaining specific, measurable, and testable."#
    )
}

/// Runs individual stages against one provider/model pair.
#[derive(Clone)]
pub struct StageRunner {
    registry: Arc<ClientRegistry>,
    provider: String,
    model: String,
    stages: StagesConfig,
}

impl StageRunner {
    pub fn new(
        registry: Arc<ClientRegistry>,
        provider: impl Into<String>,
        model: impl Into<String>,
        stages: StagesConfig,
    ) -> Self {
        Self {
            registry,
            provider: provider.into(),
            model: model.into(),
            stages,
        }
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generation options for `stage`, config overrides applied.
    pub fn options(&self, stage: Stage) -> CompletionOptions {
        let overrides = self.stages.get(stage);
        CompletionOptions {
            system_message: Some(stage.system_message().to_string()),
            max_tokens: overrides.max_tokens.unwrap_or(stage.default_max_tokens()),
            temperature: overrides.temperature.unwrap_or(stage.default_temperature()),
        }
    }

    /// Model used for `stage`.
    pub fn model_for(&self, stage: Stage) -> &str {
        self.stages.get(stage).model.as_deref().unwrap_or(&self.model)
    }

    /// Restate a hypothesis as one concrete, falsifiable claim.
    pub async fn refine(&self, hypothesis: &str) -> Result<String> {
        self.invoke(Stage::Refiner, refiner_prompt(hypothesis)).await
    }

    /// Critique a refined hypothesis.
    pub async fn analyze(&self, refined: &str) -> Result<String> {
        self.invoke(Stage::Analyzer, analyzer_prompt(refined)).await
    }

    /// Produce a revised hypothesis from the refined text and its critique.
    pub async fn revise(&self, refined: &str, critique: &str) -> Result<String> {
        self.invoke(Stage::Reviser, reviser_prompt(refined, critique))
            .await
    }

    async fn invoke(&self, stage: Stage, prompt: String) -> Result<String> {
        let model = self.model_for(stage);
        info!(stage = %stage, provider = %self.provider, model = %model, "Running stage");

        let text = complete(
            &self.registry,
            vec![Message::user(prompt)],
            model,
            &self.provider,
            self.options(stage),
        )
        .await?;

        info!(stage = %stage, chars = text.len(), "Stage complete");
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ProvidersConfig, Role, StageConfig};
    use crate::testing::{CountingCredentials, ScriptedFactory};

    fn runner(factory: Arc<ScriptedFactory>, stages: StagesConfig) -> StageRunner {
        let registry = ClientRegistry::with_parts(
            ProvidersConfig::default(),
            Arc::new(CountingCredentials::with(&[("OPENAI_API_KEY", "k")])),
            factory,
        );
        StageRunner::new(Arc::new(registry), "openai", "gpt-4o-mini", stages)
    }

    #[test]
    fn test_prompts_embed_inputs() {
        assert!(refiner_prompt("H1").contains("\"H1\""));
        assert!(analyzer_prompt("R1").contains("Refined hypothesis:\n\"R1\""));
        let revise = reviser_prompt("R1", "C1");
        assert!(revise.contains("Original hypothesis:\n\"R1\""));
        assert!(revise.contains("Reflection feedback:\n\"C1\""));
    }

    #[tokio::test]
    async fn test_stage_parameters() {
        let factory = Arc::new(ScriptedFactory::echo());
        let runner = runner(Arc::clone(&factory), StagesConfig::default());

        runner.refine("h").await.unwrap();
        runner.analyze("r").await.unwrap();
        runner.revise("r", "c").await.unwrap();

        let requests = factory.requests();
        let params: Vec<(u32, f64, &str)> = requests
            .iter()
            .map(|r| {
                (
                    r.max_tokens,
                    r.temperature,
                    r.system_message.as_deref().unwrap(),
                )
            })
            .collect();
        assert_eq!(
            params,
            vec![
                (250, 0.7, "You are a helpful experiment design assistant."),
                (400, 0.6, "You are a thoughtful and critical experiment design reviewer."),
                (250, 0.7, "You are a precise experiment improvement agent."),
            ]
        );
        for request in &requests {
            assert_eq!(request.model, "gpt-4o-mini");
            assert_eq!(request.messages.len(), 1);
            assert_eq!(request.messages[0].role, Role::User);
        }
    }

    #[tokio::test]
    async fn test_refine_is_deterministic_with_deterministic_provider() {
        let factory = Arc::new(ScriptedFactory::echo());
        let runner = runner(Arc::clone(&factory), StagesConfig::default());

        let first = runner.refine("same input").await.unwrap();
        let second = runner.refine("same input").await.unwrap();
        assert_eq!(first, second);

        let requests = factory.requests();
        assert_eq!(requests[0], requests[1]);
    }

    #[tokio::test]
    async fn test_output_returned_without_post_processing() {
        let factory = Arc::new(ScriptedFactory::new(|_, _| {
            Ok("Para one.\n\nPara two.\n\n- bullet".to_string())
        }));
        let runner = runner(factory, StagesConfig::default());
        assert_eq!(
            runner.analyze("r").await.unwrap(),
            "Para one.\n\nPara two.\n\n- bullet"
        );
    }

    #[tokio::test]
    async fn test_stage_overrides_apply() {
        let factory = Arc::new(ScriptedFactory::echo());
        let stages = StagesConfig {
            analyzer: StageConfig {
                model: Some("gpt-4o".to_string()),
                max_tokens: Some(800),
                temperature: Some(0.2),
            },
            ..StagesConfig::default()
        };
        let runner = runner(Arc::clone(&factory), stages);

        runner.analyze("r").await.unwrap();
        runner.refine("h").await.unwrap();

        let requests = factory.requests();
        assert_eq!(requests[0].model, "gpt-4o");
        assert_eq!(requests[0].max_tokens, 800);
        assert_eq!(requests[0].temperature, 0.2);
        assert_eq!(requests[1].model, "gpt-4o-mini");
        assert_eq!(requests[1].max_tokens, 250);
    }
}
