//! experimentkit CLI - Refine, critique and revise hypotheses with LLMs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use experimentkit::models::RunRecord;
use experimentkit::pipeline::load_hypotheses;
use experimentkit::{ClientRegistry, Config, HypothesisPipeline, PipelineRun, Provider};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "experimentkit")]
#[command(version)]
#[command(about = "Refine, critique and revise hypotheses via OpenAI, Anthropic or Mistral")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to configuration file (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(clap::Args, Clone)]
struct Target {
    /// Provider: openai, anthropic or mistral
    #[arg(short, long)]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long)]
    model: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full refine → analyze → revise pipeline
    Run {
        /// Hypothesis to refine
        hypothesis: String,

        #[command(flatten)]
        target: Target,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run only the Refiner stage
    Refine {
        hypothesis: String,

        #[command(flatten)]
        target: Target,
    },

    /// Run only the Analyzer stage
    Analyze {
        /// Refined hypothesis to critique
        refined: String,

        #[command(flatten)]
        target: Target,
    },

    /// Run only the Reviser stage
    Revise {
        /// Refined hypothesis
        #[arg(long)]
        refined: String,

        /// Critique to incorporate
        #[arg(long)]
        critique: String,

        #[command(flatten)]
        target: Target,
    },

    /// Run the pipeline for every hypothesis in a JSONL file
    Batch {
        /// Input JSONL: {"id"?: string, "hypothesis": string} per line
        #[arg(short, long)]
        input: PathBuf,

        /// Output JSONL of run records
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        target: Target,
    },

    /// Validate configuration and credentials without calling any provider
    Validate {
        #[command(flatten)]
        target: Target,
    },

    /// Show example configuration
    Example,
}

fn setup_logging(verbose: bool) -> Result<()> {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber).context("Failed to set subscriber")
}

fn print_example_config() {
    let example = r#"# experimentkit configuration file

[providers.openai]
# API key (default: OPENAI_API_KEY env var); ${VAR} placeholders are expanded
# api_key = "${OPENAI_API_KEY}"
# api_key_env = "OPENAI_API_KEY"
# base_url = "https://api.openai.com/v1"
timeout_secs = 180

[providers.anthropic]
# api_key_env = "ANTHROPIC_API_KEY"
timeout_secs = 180

[providers.mistral]
# api_key_env = "MISTRAL_API_KEY"
timeout_secs = 180

[pipeline]
provider = "openai"
# model = "gpt-4o-mini"

[pipeline.stages.refiner]
max_tokens = 250
temperature = 0.7

[pipeline.stages.analyzer]
max_tokens = 400
temperature = 0.6

[pipeline.stages.reviser]
max_tokens = 250
temperature = 0.7
"#;
    println!("{example}");
}

fn print_run(run: &PipelineRun) {
    println!("=== Original ===\n{}\n", run.original);
    println!("=== Refined ===\n{}\n", run.refined);
    println!("=== Critique ===\n{}\n", run.critique);
    println!("=== Revised ===\n{}", run.revised);
}

struct App {
    config: Config,
    registry: Arc<ClientRegistry>,
}

impl App {
    fn load(path: Option<&PathBuf>) -> Result<Self> {
        let config = Config::load(path.map(PathBuf::as_path))
            .with_context(|| format!("Failed to load config from {path:?}"))?;
        let registry = Arc::new(ClientRegistry::new(config.providers.clone()));
        Ok(Self { config, registry })
    }

    fn pipeline(&self, target: &Target) -> HypothesisPipeline {
        HypothesisPipeline::from_config(
            &self.config,
            Arc::clone(&self.registry),
            target.provider.as_deref(),
            target.model.as_deref(),
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose)?;

    if let Commands::Example = cli.command {
        print_example_config();
        return Ok(());
    }

    let app = App::load(cli.config.as_ref())?;

    match cli.command {
        // Handled before the config is loaded
        Commands::Example => {}

        Commands::Validate { target } => {
            let pipeline = app.pipeline(&target);
            let provider = pipeline.stages().provider();
            app.registry
                .get_client(provider)
                .with_context(|| format!("Provider '{provider}' is not usable"))?;

            info!("Configuration is valid");
            info!("  Provider: {provider}");
            info!("  Model:    {}", pipeline.stages().model());
            let compiled: Vec<&str> = Provider::ALL
                .iter()
                .filter(|p| p.is_available())
                .map(|p| p.as_str())
                .collect();
            info!("  Compiled providers: {}", compiled.join(", "));
        }

        Commands::Run {
            hypothesis,
            target,
            json,
        } => {
            let pipeline = app.pipeline(&target);
            let run = pipeline.run(&hypothesis).await?;

            if json {
                let record = RunRecord::new(
                    Uuid::new_v4().to_string(),
                    pipeline.stages().provider(),
                    pipeline.stages().model(),
                    run,
                );
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_run(&run);
            }
        }

        Commands::Refine { hypothesis, target } => {
            let text = app.pipeline(&target).stages().refine(&hypothesis).await?;
            println!("{text}");
        }

        Commands::Analyze { refined, target } => {
            let text = app.pipeline(&target).stages().analyze(&refined).await?;
            println!("{text}");
        }

        Commands::Revise {
            refined,
            critique,
            target,
        } => {
            let text = app
                .pipeline(&target)
                .stages()
                .revise(&refined, &critique)
                .await?;
            println!("{text}");
        }

        Commands::Batch {
            input,
            output,
            target,
        } => {
            let pipeline = app.pipeline(&target);
            let inputs = load_hypotheses(&input)
                .with_context(|| format!("Failed to load hypotheses from {input:?}"))?;

            let stats = pipeline.run_batch(inputs, &output, true).await?;

            println!("\n=== Batch Complete ===");
            println!("Hypotheses:  {}", stats.total);
            println!("Succeeded:   {}", stats.succeeded);
            println!("Failed:      {}", stats.failed());
            if !stats.failed_ids.is_empty() {
                println!("Failed IDs:  {}", stats.failed_ids.join(", "));
            }
            println!("Runtime:     {:.1}s", stats.runtime_secs);
            println!("Output:      {output:?}");
        }
    }

    Ok(())
}
