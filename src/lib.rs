pub mod agent;
pub mod cli;
pub mod config;
pub mod llm;
pub mod models;
pub mod report;

use agent::{ FeatureRoiAgent, PlanRequest };
use cli::Args;
use config::prompt::{ resolve_prompts, PromptError };
use llm::chat::{ new_client, ChatError };
use log::{ info, warn };
use std::io::Write;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("{0}")]
    EmptyFeature(String),

    #[error("{message}")]
    Chat {
        message: String,
        source: ChatError,
    },

    #[error("Failed to load prompt templates: {0}")]
    Prompt(#[from] PromptError),

    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
}

/// Validates the input, calls the model once and returns the rendered report.
pub async fn generate_report(args: &Args) -> Result<String, RunError> {
    let prompts = Arc::new(resolve_prompts(args.prompts_path.as_deref())?);
    let messages = prompts.messages.get(args.language).clone();

    let llm_config = args.llm_config();
    let chat_error = |source: ChatError| RunError::Chat {
        message: report::render_chat_error(&messages, &source),
        source,
    };

    // Credential is checked before the feature text.
    if llm_config.api_key.trim().is_empty() {
        return Err(chat_error(ChatError::MissingCredential));
    }
    let feature = args.feature.trim();
    if feature.is_empty() {
        return Err(RunError::EmptyFeature(messages.missing_feature.clone()));
    }

    let chat_client = new_client(&llm_config).map_err(chat_error)?;
    let agent = FeatureRoiAgent::new(chat_client, prompts.clone(), llm_config.temperature);

    let request = PlanRequest {
        feature: feature.to_string(),
        traffic: args.traffic,
        language: args.language,
    };

    info!("{}", messages.busy);
    let text = agent
        .generate_plan(&llm_config.api_key, &llm_config.model, &request).await
        .map_err(chat_error)?;

    Ok(report::render_report(&messages, &text))
}

pub async fn run(args: Args) -> Result<(), RunError> {
    info!("--- Core Configuration ---");
    info!("Model: {}", args.model);
    info!("Base URL: {}", args.base_url);
    info!("Temperature: {}", llm::DEFAULT_TEMPERATURE);
    info!("Language: {}", args.language);
    info!("Traffic Hint: {}", args.traffic);
    info!("API Key Provided: {}", !args.api_key.trim().is_empty());
    info!("Prompts Path: {}", args.prompts_path.as_deref().unwrap_or("<built-in>"));
    info!("-------------------------");

    let report = generate_report(&args).await?;
    deliver_report(&report, args.output.as_deref(), &mut std::io::stdout().lock())
}

/// Writes the report to `out` first, then to `output` if given. A failing
/// file write still leaves the report on `out`.
pub fn deliver_report<W: Write>(
    report: &str,
    output: Option<&str>,
    out: &mut W
) -> Result<(), RunError> {
    writeln!(out, "{}", report)?;
    out.flush()?;

    if let Some(path) = output {
        if let Err(e) = report::write_report(path, report) {
            warn!("Could not write report to {}: {}", path, e);
            return Err(RunError::Io(e));
        }
        info!("Report written to {}", path);
    }
    Ok(())
}
