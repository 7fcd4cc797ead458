pub mod openai;
pub mod transport;

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use self::openai::OpenAIChatClient;
use self::transport::ReqwestTransport;
use super::LlmConfig;
use crate::models::chat::Conversation;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ChatError {
    #[error("API key not provided")]
    MissingCredential,

    #[error("model name not provided")]
    MissingModel,

    #[error("API key contains characters not allowed in an HTTP header (check for stray newlines or spaces)")]
    InvalidCredential,

    #[error("connection error while calling the API: {0}")]
    ConnectionError(String),

    #[error("API error (HTTP {status_code}): {message}")]
    ApiError { status_code: u16, message: String },

    #[error("unexpected API response: {body}")]
    MalformedResponse { body: String },
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Sends `conversation` once and returns the assistant's text.
    async fn complete(
        &self,
        credential: &str,
        model: &str,
        conversation: &Conversation,
        temperature: f64
    ) -> Result<String, ChatError>;
}

pub fn new_client(config: &LlmConfig) -> Result<Arc<dyn ChatClient>, ChatError> {
    let transport = ReqwestTransport::new(config.timeout)?;
    let client = OpenAIChatClient::with_transport(config.base_url.clone(), Arc::new(transport));
    Ok(Arc::new(client))
}
