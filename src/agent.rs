use log::info;
use std::sync::Arc;

use crate::config::prompt::{ self, PromptConfig };
use crate::llm::chat::{ ChatClient, ChatError };
use crate::models::chat::{ Conversation, Language, TrafficHint };

/// Builds the system/user pair for one report.
///
/// `feature` is inserted as given; callers reject blank input beforehand.
pub fn build_conversation(
    prompts: &PromptConfig,
    feature: &str,
    traffic: TrafficHint,
    language: Language
) -> Conversation {
    let system = prompt::get_system_prompt(prompts, language);
    let user = prompt::get_user_prompt(prompts, language, feature, traffic);
    Conversation::new(system, user)
}

#[derive(Debug, Clone)]
pub struct PlanRequest {
    pub feature: String,
    pub traffic: TrafficHint,
    pub language: Language,
}

#[derive(Clone)]
pub struct FeatureRoiAgent {
    chat_client: Arc<dyn ChatClient>,
    prompt_config: Arc<PromptConfig>,
    temperature: f64,
}

impl FeatureRoiAgent {
    pub fn new(
        chat_client: Arc<dyn ChatClient>,
        prompt_config: Arc<PromptConfig>,
        temperature: f64
    ) -> Self {
        Self { chat_client, prompt_config, temperature }
    }

    /// Credential and model are taken per call so a changed setting applies
    /// to the next request without rebuilding the agent.
    pub async fn generate_plan(
        &self,
        credential: &str,
        model: &str,
        request: &PlanRequest
    ) -> Result<String, ChatError> {
        let conversation = build_conversation(
            &self.prompt_config,
            &request.feature,
            request.traffic,
            request.language
        );
        info!(
            "Generating ROI plan (language: {}, traffic: {}, feature: {} chars)",
            request.language,
            request.traffic,
            request.feature.chars().count()
        );
        self.chat_client.complete(credential, model, &conversation, self.temperature).await
    }
}
