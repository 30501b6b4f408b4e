//! Messages, requests and pipeline results.
//!
//! All of these are transient: built for one call or one run, then dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Speaker of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// One role-tagged message in a conversation turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Generation parameters for a single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOptions {
    /// Instruction framing, conveyed per provider shape
    pub system_message: Option<String>,
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f64,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            system_message: None,
            max_tokens: 250,
            temperature: 0.7,
        }
    }
}

/// Provider-agnostic request handed to an adapter.
///
/// Fully specified before dispatch and never mutated afterwards; each
/// adapter derives its own wire payload from it.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub model: String,
    pub messages: Vec<Message>,
    pub system_message: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl GenerationRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Message>, options: CompletionOptions) -> Self {
        Self {
            model: model.into(),
            messages,
            system_message: options.system_message,
            max_tokens: options.max_tokens,
            temperature: options.temperature,
        }
    }

    /// Concatenated content of all user messages.
    pub fn user_text(&self) -> String {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Outputs of one full refine → analyze → revise run.
///
/// Only ever constructed once all three stages have succeeded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pub original: String,
    pub refined: String,
    pub critique: String,
    pub revised: String,
}

/// One line of batch input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HypothesisInput {
    /// Optional caller-supplied identifier (generated when absent)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Hypothesis text to refine
    pub hypothesis: String,
}

/// A completed run as written to output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    pub id: String,
    pub provider: String,
    pub model: String,
    #[serde(flatten)]
    pub run: PipelineRun,
    pub completed_at: DateTime<Utc>,
}

impl RunRecord {
    pub fn new(
        id: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
        run: PipelineRun,
    ) -> Self {
        Self {
            id: id.into(),
            provider: provider.into(),
            model: model.into(),
            run,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Provider;

    #[test]
    fn test_completion_defaults() {
        let options = CompletionOptions::default();
        assert_eq!(options.system_message, None);
        assert_eq!(options.max_tokens, 250);
        assert_eq!(options.temperature, 0.7);
    }

    #[test]
    fn test_message_roles_serialize_lowercase() {
        let json = serde_json::to_value(Message::system("S")).unwrap();
        assert_eq!(json, serde_json::json!({"role": "system", "content": "S"}));
    }

    #[test]
    fn test_user_text_skips_other_roles() {
        let request = GenerationRequest::new(
            "m",
            vec![Message::system("ignored"), Message::user("a"), Message::user("b")],
            CompletionOptions::default(),
        );
        assert_eq!(request.user_text(), "a\nb");
    }

    #[test]
    fn test_run_record_flattens_pipeline_fields() {
        let record = RunRecord::new(
            "r1",
            Provider::OpenAi.as_str(),
            "gpt-4o-mini",
            PipelineRun {
                original: "o".to_string(),
                refined: "r".to_string(),
                critique: "c".to_string(),
                revised: "v".to_string(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["provider"], "openai");
        assert_eq!(json["refined"], "r");
        assert_eq!(json["revised"], "v");
        assert!(json.get("completed_at").is_some());
    }

    #[test]
    fn test_hypothesis_input_id_is_optional() {
        let input: HypothesisInput = serde_json::from_str(r#"{"hypothesis": "h"}"#).unwrap();
        assert!(input.id.is_none());
        assert_eq!(input.hypothesis, "h");
    }
}
