//! Batch driver: JSONL hypotheses in, JSONL run records out.
//!
//! Runs are executed one after another. A failed run is logged and skipped;
//! it never produces a partial record.

use crate::models::{ExperimentError, HypothesisInput, Result, RunRecord};
use crate::pipeline::HypothesisPipeline;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::time::Instant;
use tracing::{info, warn};
use uuid::Uuid;

/// Outcome counts for a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchStats {
    pub total: usize,
    pub succeeded: usize,
    pub failed_ids: Vec<String>,
    pub runtime_secs: f64,
}

impl BatchStats {
    pub fn failed(&self) -> usize {
        self.failed_ids.len()
    }
}

/// Load hypotheses from a JSONL file. Blank lines are skipped.
pub fn load_hypotheses(path: &Path) -> Result<Vec<HypothesisInput>> {
    let file = File::open(path).map_err(|e| ExperimentError::io("opening hypotheses file", e))?;
    let reader = BufReader::new(file);
    let mut inputs = Vec::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| ExperimentError::io("reading hypotheses file", e))?;
        if line.trim().is_empty() {
            continue;
        }
        let input: HypothesisInput = serde_json::from_str(&line)
            .map_err(|e| ExperimentError::ParseError(format!("Line {}: {}", line_num + 1, e)))?;
        if input.hypothesis.trim().is_empty() {
            return Err(ExperimentError::InvalidInput(format!(
                "Line {}: hypothesis is empty",
                line_num + 1
            )));
        }
        inputs.push(input);
    }

    info!(count = inputs.len(), "Loaded hypotheses");
    Ok(inputs)
}

fn progress_bar(total: usize, visible: bool) -> ProgressBar {
    if !visible {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new(total as u64);
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({percent}%) {msg}")
        .map(|s| s.progress_chars("##-"))
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    pb.set_style(style);
    pb
}

impl HypothesisPipeline {
    /// Run every input through the pipeline and write one record per success.
    pub async fn run_batch(
        &self,
        inputs: Vec<HypothesisInput>,
        output_path: &Path,
        show_progress: bool,
    ) -> Result<BatchStats> {
        let start = Instant::now();
        let output_file =
            File::create(output_path).map_err(|e| ExperimentError::io("creating output file", e))?;
        let mut writer = BufWriter::new(output_file);

        let mut stats = BatchStats {
            total: inputs.len(),
            ..BatchStats::default()
        };
        let pb = progress_bar(inputs.len(), show_progress);

        for input in inputs {
            let id = input.id.unwrap_or_else(|| Uuid::new_v4().to_string());

            match self.run(&input.hypothesis).await {
                Ok(run) => {
                    let record = RunRecord::new(
                        id,
                        self.stages().provider(),
                        self.stages().model(),
                        run,
                    );
                    let json = serde_json::to_string(&record).map_err(|e| {
                        ExperimentError::ParseError(format!("Failed to serialize record: {e}"))
                    })?;
                    writeln!(writer, "{json}")
                        .map_err(|e| ExperimentError::io("writing output", e))?;
                    writer
                        .flush()
                        .map_err(|e| ExperimentError::io("flushing output", e))?;
                    stats.succeeded += 1;
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "Pipeline run failed");
                    stats.failed_ids.push(id);
                }
            }

            pb.inc(1);
            pb.set_message(format!("ok: {}, failed: {}", stats.succeeded, stats.failed()));
        }

        pb.finish_with_message(format!(
            "Done! {} succeeded, {} failed",
            stats.succeeded,
            stats.failed()
        ));

        stats.runtime_secs = start.elapsed().as_secs_f64();
        info!(
            total = stats.total,
            succeeded = stats.succeeded,
            failed = stats.failed(),
            "Batch complete"
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ClientRegistry;
    use crate::models::{Config, ProviderError, ProvidersConfig};
    use crate::testing::{CountingCredentials, ScriptedFactory};
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn pipeline(factory: Arc<ScriptedFactory>) -> HypothesisPipeline {
        let registry = ClientRegistry::with_parts(
            ProvidersConfig::default(),
            Arc::new(CountingCredentials::with(&[("OPENAI_API_KEY", "k")])),
            factory,
        );
        HypothesisPipeline::from_config(&Config::default(), Arc::new(registry), None, None)
    }

    #[test]
    fn test_load_hypotheses() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("in.jsonl");
        fs::write(
            &path,
            "{\"id\": \"a\", \"hypothesis\": \"first\"}\n\n{\"hypothesis\": \"second\"}\n",
        )
        .unwrap();

        let inputs = load_hypotheses(&path).unwrap();
        assert_eq!(inputs.len(), 2);
        assert_eq!(inputs[0].id.as_deref(), Some("a"));
        assert_eq!(inputs[1].hypothesis, "second");
    }

    #[test]
    fn test_load_reports_bad_line() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("in.jsonl");
        fs::write(&path, "{\"hypothesis\": \"ok\"}\nnot json\n").unwrap();

        let err = load_hypotheses(&path).unwrap_err();
        assert!(matches!(err, ExperimentError::ParseError(ref m) if m.starts_with("Line 2")));
    }

    #[test]
    fn test_load_rejects_empty_hypothesis() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("in.jsonl");
        fs::write(&path, "{\"hypothesis\": \"   \"}\n").unwrap();

        assert!(matches!(
            load_hypotheses(&path).unwrap_err(),
            ExperimentError::InvalidInput(_)
        ));
    }

    #[tokio::test]
    async fn test_batch_skips_failed_runs() {
        let factory = Arc::new(ScriptedFactory::new(|_, r| {
            if r.user_text().contains("explode") {
                Err(ProviderError::Transport("down".to_string()))
            } else {
                Ok("fine".to_string())
            }
        }));
        let pipeline = pipeline(factory);

        let temp_dir = TempDir::new().unwrap();
        let output = temp_dir.path().join("out.jsonl");
        let inputs = vec![
            HypothesisInput {
                id: Some("good".to_string()),
                hypothesis: "works".to_string(),
            },
            HypothesisInput {
                id: Some("bad".to_string()),
                hypothesis: "explode".to_string(),
            },
        ];

        let stats = pipeline.run_batch(inputs, &output, false).await.unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed_ids, vec!["bad".to_string()]);

        let written = fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 1);
        let record: RunRecord = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(record.id, "good");
        assert_eq!(record.provider, "openai");
        assert_eq!(record.run.original, "works");
        assert_eq!(record.run.revised, "fine");
    }
}
