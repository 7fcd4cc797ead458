use clap::Parser;
use std::time::Duration;

use crate::llm::{ LlmConfig, DEFAULT_BASE_URL, DEFAULT_MODEL, DEFAULT_TEMPERATURE };
use crate::models::chat::{ Language, TrafficHint };

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    // --- Report Input Args ---
    /// Short description of the product feature to measure
    #[arg(short = 'f', long, env = "FEATURE_TEXT")]
    pub feature: String,

    /// Expected traffic level of the feature (unknown, low, medium, high)
    #[arg(short = 't', long, env = "TRAFFIC_HINT", default_value = "unknown")]
    pub traffic: TrafficHint,

    /// Language of the generated report (pt, en)
    #[arg(short = 'l', long, env = "REPORT_LANGUAGE", default_value = "pt")]
    pub language: Language,

    // --- Chat LLM Provider Args ---
    /// API key for the chat completion provider. Left empty, the request is refused before sending.
    #[arg(short = 'k', long, env = "OPENAI_API_KEY", default_value = "", hide_env_values = true)]
    pub api_key: String,

    /// Model name for chat completion (e.g., gpt-4o-mini, gpt-4o, gpt-4.1)
    #[arg(short = 'm', long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    /// Base URL of the chat completion API; "/chat/completions" is appended unless already present
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Request timeout in seconds. No timeout beyond the HTTP client's default when unset.
    #[arg(long, env = "OPENAI_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    // --- General App Args ---
    /// Path to a prompt configuration file. The built-in templates are used when unset.
    #[arg(long, env = "PROMPTS_PATH")]
    pub prompts_path: Option<String>,

    /// Also write the generated report to this file
    #[arg(short = 'o', long, env = "REPORT_OUTPUT")]
    pub output: Option<String>,
}

impl Args {
    /// Temperature is not a setting; every request goes out at [`DEFAULT_TEMPERATURE`].
    pub fn llm_config(&self) -> LlmConfig {
        LlmConfig {
            api_key: self.api_key.clone(),
            model: self.model.clone(),
            base_url: self.base_url.clone(),
            temperature: DEFAULT_TEMPERATURE,
            timeout: self.timeout_secs.map(Duration::from_secs),
        }
    }
}
