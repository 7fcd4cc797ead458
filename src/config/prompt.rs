use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use log::info;

use crate::models::chat::{ Language, TrafficHint };

const DEFAULT_PROMPTS: &str = include_str!("../../json/prompts.json");

const FEATURE_PLACEHOLDER: &str = "{feature}";
const TRAFFIC_PLACEHOLDER: &str = "{traffic}";

#[derive(Debug)]
pub enum PromptError {
    PlaceholderMissing(String),
    EmptyTemplate(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::PlaceholderMissing(key) =>
                write!(f, "Prompt template is missing placeholder {}", key),
            PromptError::EmptyTemplate(key) => write!(f, "Prompt template '{}' is empty", key),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// One value per supported report language.
#[derive(Deserialize, Debug, Clone)]
pub struct Localized<T> {
    pub pt: T,
    pub en: T,
}

impl<T> Localized<T> {
    pub fn get(&self, language: Language) -> &T {
        match language {
            Language::Pt => &self.pt,
            Language::En => &self.en,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct TrafficLabels {
    pub unknown: String,
    pub low: String,
    pub medium: String,
    pub high: String,
}

impl TrafficLabels {
    pub fn get(&self, hint: TrafficHint) -> &str {
        match hint {
            TrafficHint::Unknown => &self.unknown,
            TrafficHint::Low => &self.low,
            TrafficHint::Medium => &self.medium,
            TrafficHint::High => &self.high,
        }
    }
}

/// Strings shown around the report by the command-line front end.
#[derive(Deserialize, Debug, Clone)]
pub struct UiMessages {
    pub report_title: String,
    pub busy: String,
    pub api_error: String,
    pub missing_feature: String,
    pub missing_credential: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct PromptConfig {
    pub system_prompts: Localized<String>,
    /// Must contain `{feature}` and `{traffic}`.
    pub user_prompts: Localized<String>,
    pub traffic_labels: Localized<TrafficLabels>,
    pub messages: Localized<UiMessages>,
}

impl PromptConfig {
    /// Templates compiled into the binary from `json/prompts.json`.
    pub fn builtin() -> Result<Self, PromptError> {
        load_prompts_from_str(DEFAULT_PROMPTS)
    }

    fn validate(&self) -> Result<(), PromptError> {
        for language in [Language::Pt, Language::En] {
            if self.system_prompts.get(language).trim().is_empty() {
                return Err(PromptError::EmptyTemplate(format!("system_prompts:{}", language)));
            }
            let user = self.user_prompts.get(language);
            for placeholder in [FEATURE_PLACEHOLDER, TRAFFIC_PLACEHOLDER] {
                if !user.contains(placeholder) {
                    return Err(
                        PromptError::PlaceholderMissing(
                            format!("{} in user_prompts:{}", placeholder, language)
                        )
                    );
                }
            }
        }
        Ok(())
    }
}

pub fn load_prompts_from_str(content: &str) -> Result<PromptConfig, PromptError> {
    let config: PromptConfig = serde_json::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<PromptConfig, PromptError> {
    let path = path.as_ref();
    info!("Loading prompt templates from {}", path.display());
    let content = fs::read_to_string(path)?;
    load_prompts_from_str(&content)
}

/// Uses the file at `path` when given, the built-in templates otherwise.
pub fn resolve_prompts(path: Option<&str>) -> Result<PromptConfig, PromptError> {
    match path {
        Some(p) => load_prompts(p),
        None => PromptConfig::builtin(),
    }
}

pub fn get_system_prompt(config: &PromptConfig, language: Language) -> &str {
    config.system_prompts.get(language)
}

pub fn get_traffic_label(config: &PromptConfig, language: Language, hint: TrafficHint) -> &str {
    config.traffic_labels.get(language).get(hint)
}

pub fn get_user_prompt(
    config: &PromptConfig,
    language: Language,
    feature: &str,
    hint: TrafficHint
) -> String {
    let template = config.user_prompts.get(language);
    let traffic = get_traffic_label(config, language, hint);
    // Traffic goes first so a literal "{traffic}" typed into the feature stays untouched.
    template.replace(TRAFFIC_PLACEHOLDER, traffic).replace(FEATURE_PLACEHOLDER, feature)
}
