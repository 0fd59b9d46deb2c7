//! Run command - clean a file end to end.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use cleanroom::{
    AnthropicProvider, GeminiProvider, LlmConfig, LlmProvider, MockProvider, OllamaProvider,
    OpenAIProvider, Pipeline, PipelineConfig, PipelineOutcome, RunStatus,
};
use colored::Colorize;
use tracing::debug;

use crate::cli::LlmProviderChoice;

/// Arguments for a cleaning run.
pub struct RunArgs {
    pub input: PathBuf,
    pub output: PathBuf,
    pub log: PathBuf,
    pub config: Option<PathBuf>,
    pub llm: LlmProviderChoice,
    pub model: Option<String>,
    pub max_iterations: Option<usize>,
    pub timeout: Option<u64>,
}

pub fn run(args: RunArgs, json_output: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(max) = args.max_iterations {
        config.max_iterations = max;
    }
    config.validate()?;

    if !json_output {
        println!(
            "{} {}",
            "Cleaning".cyan().bold(),
            args.input.display().to_string().white()
        );
    }

    let mut pipeline = Pipeline::with_config(config);
    if let Some(provider) = build_provider(args.llm, args.model.as_deref(), args.timeout)? {
        if verbose {
            println!(
                "  {} {} ({})",
                "LLM:".dimmed(),
                provider.name(),
                provider.config().model
            );
        }
        pipeline = pipeline.with_shared_llm(provider);
    }

    let outcome = match pipeline.run_file(&args.input, &args.output) {
        Ok(outcome) => outcome,
        Err(failure) => {
            failure.write_log(&args.log)?;
            return Err(failure.into());
        }
    };
    outcome.write_log(&args.log)?;
    debug!(entries = outcome.audit.len(), "audit log written");

    if json_output {
        let summary = serde_json::json!({
            "input": args.input,
            "output": args.output,
            "log": args.log,
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    print_summary(&outcome, &args);
    Ok(())
}

/// Build the configured LLM provider, if any.
fn build_provider(
    choice: LlmProviderChoice,
    model: Option<&str>,
    timeout: Option<u64>,
) -> Result<Option<Arc<dyn LlmProvider>>, Box<dyn std::error::Error>> {
    let configure = |mut config: LlmConfig| {
        if let Some(model) = model {
            config.model = model.to_string();
        }
        if let Some(secs) = timeout {
            config.timeout = Duration::from_secs(secs);
        }
        config
    };

    let provider: Arc<dyn LlmProvider> = match choice {
        LlmProviderChoice::None => return Ok(None),
        LlmProviderChoice::Anthropic => Arc::new(AnthropicProvider::from_env(configure(
            AnthropicProvider::default_config(),
        ))?),
        LlmProviderChoice::OpenAI => Arc::new(OpenAIProvider::from_env(configure(
            OpenAIProvider::default_config(),
        ))?),
        LlmProviderChoice::Gemini => Arc::new(GeminiProvider::from_env(configure(
            GeminiProvider::default_config(),
        ))?),
        LlmProviderChoice::Ollama => Arc::new(OllamaProvider::with_config(configure(
            OllamaProvider::default_config(),
        ))?),
        LlmProviderChoice::Mock => Arc::new(MockProvider::new()),
    };
    Ok(Some(provider))
}

fn print_summary(outcome: &PipelineOutcome, args: &RunArgs) {
    println!();
    let status = match outcome.status {
        RunStatus::Clean => "No issues found".green().bold(),
        RunStatus::Corrected => "Issues corrected".green().bold(),
        RunStatus::Resolved => "All issues resolved".green().bold(),
        RunStatus::Unresolved => "Issues remain".yellow().bold(),
    };
    println!("{} {}", "Status:".bold(), status);
    println!(
        "  Iterations: {}  Detection runs: {}  Enrichments: {}",
        outcome.iterations, outcome.detection_runs, outcome.enrichments_applied
    );

    if !outcome.unresolved.is_empty() {
        println!();
        println!(
            "{} {} rows still carry issues:",
            "Warning:".yellow().bold(),
            outcome.unresolved.len()
        );
        for row in outcome.unresolved.iter().take(10) {
            println!("  row {}: {}", row.row, row.issues.dimmed());
        }
        if outcome.unresolved.len() > 10 {
            println!("  ... and {} more", outcome.unresolved.len() - 10);
        }
    }

    println!();
    println!(
        "{} {}",
        "Cleaned data:".green().bold(),
        args.output.display()
    );
    println!("{} {}", "Log:".dimmed(), args.log.display());
}
