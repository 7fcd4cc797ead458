use async_trait::async_trait;
use log::{ error, info, warn };
use serde::{ Deserialize, Serialize };
use std::sync::Arc;

use super::transport::{ HttpResponse, JsonTransport };
use super::{ ChatClient, ChatError };
use crate::models::chat::{ ChatMessage, Conversation };

const CHAT_COMPLETIONS_ROUTE: &str = "/chat/completions";

pub struct OpenAIChatClient {
    transport: Arc<dyn JsonTransport>,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f64,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    content: String,
}

#[derive(Deserialize)]
struct OpenAIErrorEnvelope {
    error: OpenAIErrorBody,
}

/// Current endpoints send `{"error": {"message": ...}}`; older ones sent a bare string.
#[derive(Deserialize)]
#[serde(untagged)]
enum OpenAIErrorBody {
    Detailed {
        message: String,
    },
    Plain(String),
}

impl OpenAIChatClient {
    pub fn with_transport(base_url: String, transport: Arc<dyn JsonTransport>) -> Self {
        Self { transport, base_url }
    }

    pub fn endpoint(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with(CHAT_COMPLETIONS_ROUTE) {
            base.to_string()
        } else {
            format!("{}{}", base, CHAT_COMPLETIONS_ROUTE)
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        credential: &str,
        model: &str,
        conversation: &Conversation,
        temperature: f64
    ) -> Result<String, ChatError> {
        if credential.trim().is_empty() {
            return Err(ChatError::MissingCredential);
        }
        if credential.chars().any(|c| c.is_control()) {
            return Err(ChatError::InvalidCredential);
        }
        if model.trim().is_empty() {
            return Err(ChatError::MissingModel);
        }

        let req = OpenAIChatRequest {
            model,
            messages: conversation.messages(),
            temperature,
        };
        let body = serde_json
            ::to_value(&req)
            .map_err(|e| ChatError::ConnectionError(format!("Failed to encode request: {}", e)))?;

        let url = self.endpoint();
        info!("Requesting chat completion from {} (model: {})", url, model);

        let resp = match self.transport.post_json(&url, credential, &body).await {
            Ok(r) => r,
            Err(e) => {
                error!("Chat completion request failed: {}", e);
                return Err(e);
            }
        };

        parse_completion(resp)
    }
}

/// Classifies a raw HTTP exchange into the generated text or a [`ChatError`].
pub fn parse_completion(resp: HttpResponse) -> Result<String, ChatError> {
    if !resp.is_success() {
        let message = error_message(&resp);
        warn!("Chat API returned HTTP {}: {}", resp.status, message);
        return Err(ChatError::ApiError { status_code: resp.status, message });
    }

    match serde_json::from_str::<OpenAIResponse>(&resp.body) {
        Ok(parsed) =>
            match parsed.choices.into_iter().next() {
                Some(choice) => Ok(choice.message.content),
                None => {
                    warn!("Chat API response has no choices");
                    Err(ChatError::MalformedResponse { body: resp.body })
                }
            }
        Err(e) => {
            warn!("Chat API response did not match the expected shape: {}", e);
            Err(ChatError::MalformedResponse { body: resp.body })
        }
    }
}

fn error_message(resp: &HttpResponse) -> String {
    match serde_json::from_str::<OpenAIErrorEnvelope>(&resp.body) {
        Ok(OpenAIErrorEnvelope { error: OpenAIErrorBody::Detailed { message } }) => message,
        Ok(OpenAIErrorEnvelope { error: OpenAIErrorBody::Plain(message) }) => message,
        Err(_) =>
            resp.reason.clone().unwrap_or_else(|| format!("HTTP {}", resp.status)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{ json, Value };
    use std::sync::Mutex;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    struct FakeTransport {
        calls: AtomicUsize,
        last: Mutex<Option<(String, String, Value)>>,
        reply: Result<HttpResponse, ChatError>,
    }

    impl FakeTransport {
        fn replying(status: u16, reason: Option<&str>, body: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
                reply: Ok(HttpResponse {
                    status,
                    reason: reason.map(str::to_string),
                    body: body.to_string(),
                }),
            })
        }

        fn failing(err: ChatError) -> Arc<Self> {
            Arc::new(Self { calls: AtomicUsize::new(0), last: Mutex::new(None), reply: Err(err) })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl JsonTransport for FakeTransport {
        async fn post_json(
            &self,
            url: &str,
            credential: &str,
            body: &Value
        ) -> Result<HttpResponse, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some((
                url.to_string(),
                credential.to_string(),
                body.clone(),
            ));
            self.reply.clone()
        }
    }

    fn client(transport: Arc<FakeTransport>) -> OpenAIChatClient {
        OpenAIChatClient::with_transport("https://api.openai.com/v1".to_string(), transport)
    }

    fn conversation() -> Conversation {
        Conversation::new("You are an analyst.", "Feature: dark mode")
    }

    #[tokio::test]
    async fn empty_credential_never_reaches_the_transport() {
        let transport = FakeTransport::replying(200, Some("OK"), "{}");
        let client = client(transport.clone());

        for credential in ["", "   "] {
            let err = client
                .complete(credential, "gpt-4o-mini", &conversation(), 0.3).await
                .unwrap_err();
            assert_eq!(err, ChatError::MissingCredential);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn credential_with_control_characters_is_rejected_locally() {
        let transport = FakeTransport::replying(200, Some("OK"), "{}");
        let client = client(transport.clone());

        for credential in ["sk-test\n", "sk-\ttest", "sk-test\r\n"] {
            let err = client
                .complete(credential, "gpt-4o-mini", &conversation(), 0.3).await
                .unwrap_err();
            assert_eq!(err, ChatError::InvalidCredential);
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn empty_model_never_reaches_the_transport() {
        let transport = FakeTransport::replying(200, Some("OK"), "{}");
        let err = client(transport.clone())
            .complete("sk-test", "", &conversation(), 0.3).await
            .unwrap_err();
        assert_eq!(err, ChatError::MissingModel);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn returns_first_choice_content() {
        let transport = FakeTransport::replying(
            200,
            Some("OK"),
            r#"{"choices":[{"message":{"content":"X"}}]}"#
        );
        let text = client(transport.clone())
            .complete("sk-test", "gpt-4o-mini", &conversation(), 0.3).await
            .unwrap();
        assert_eq!(text, "X");
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn sends_model_messages_and_temperature() {
        let transport = FakeTransport::replying(
            200,
            Some("OK"),
            r#"{"choices":[{"message":{"role":"assistant","content":"ok"}}]}"#
        );
        client(transport.clone())
            .complete("sk-test", "gpt-4o", &conversation(), 0.3).await
            .unwrap();

        let (url, credential, body) = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(url, "https://api.openai.com/v1/chat/completions");
        assert_eq!(credential, "sk-test");
        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(
            body["messages"],
            json!([
                { "role": "system", "content": "You are an analyst." },
                { "role": "user", "content": "Feature: dark mode" }
            ])
        );
        assert_eq!(body["temperature"], json!(0.3));
    }

    #[tokio::test]
    async fn transport_failure_is_passed_through() {
        let transport = FakeTransport::failing(
            ChatError::ConnectionError("connection refused".to_string())
        );
        let err = client(transport.clone())
            .complete("sk-test", "gpt-4o-mini", &conversation(), 0.3).await
            .unwrap_err();
        assert_eq!(err, ChatError::ConnectionError("connection refused".to_string()));
        assert_eq!(transport.calls(), 1);
    }

    #[test]
    fn api_error_uses_error_message_field() {
        let err = parse_completion(HttpResponse {
            status: 401,
            reason: Some("Unauthorized".to_string()),
            body: r#"{"error":{"message":"invalid api key","type":"invalid_request_error"}}"#.to_string(),
        }).unwrap_err();
        assert_eq!(err, ChatError::ApiError {
            status_code: 401,
            message: "invalid api key".to_string(),
        });
    }

    #[test]
    fn api_error_accepts_plain_string_envelope() {
        let err = parse_completion(HttpResponse {
            status: 429,
            reason: Some("Too Many Requests".to_string()),
            body: r#"{"error":"rate limited"}"#.to_string(),
        }).unwrap_err();
        assert_eq!(err, ChatError::ApiError {
            status_code: 429,
            message: "rate limited".to_string(),
        });
    }

    #[test]
    fn api_error_falls_back_to_status_text() {
        let err = parse_completion(HttpResponse {
            status: 502,
            reason: Some("Bad Gateway".to_string()),
            body: "<html>upstream down</html>".to_string(),
        }).unwrap_err();
        assert_eq!(err, ChatError::ApiError {
            status_code: 502,
            message: "Bad Gateway".to_string(),
        });

        let err = parse_completion(HttpResponse {
            status: 599,
            reason: None,
            body: String::new(),
        }).unwrap_err();
        assert_eq!(err, ChatError::ApiError { status_code: 599, message: "HTTP 599".to_string() });
    }

    #[test]
    fn success_without_choices_is_malformed() {
        let body = r#"{"id":"chatcmpl-1","object":"chat.completion"}"#;
        let err = parse_completion(HttpResponse {
            status: 200,
            reason: Some("OK".to_string()),
            body: body.to_string(),
        }).unwrap_err();
        assert_eq!(err, ChatError::MalformedResponse { body: body.to_string() });
    }

    #[test]
    fn success_with_empty_choices_or_bad_json_is_malformed() {
        for body in [r#"{"choices":[]}"#, "not json", r#"{"choices":[{"message":{}}]}"#] {
            let err = parse_completion(HttpResponse {
                status: 200,
                reason: Some("OK".to_string()),
                body: body.to_string(),
            }).unwrap_err();
            assert_eq!(err, ChatError::MalformedResponse { body: body.to_string() });
        }
    }

    #[test]
    fn endpoint_accepts_full_route_or_base() {
        let transport = FakeTransport::replying(200, None, "{}");
        let full = OpenAIChatClient::with_transport(
            "http://localhost:8080/v1/chat/completions/".to_string(),
            transport.clone()
        );
        assert_eq!(full.endpoint(), "http://localhost:8080/v1/chat/completions");
        let base = OpenAIChatClient::with_transport("http://localhost:8080/v1/".to_string(), transport);
        assert_eq!(base.endpoint(), "http://localhost:8080/v1/chat/completions");
    }
}
