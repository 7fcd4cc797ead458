use async_trait::async_trait;
use log::debug;
use reqwest::{ Client as HttpClient, header::{ HeaderValue, AUTHORIZATION, CONTENT_TYPE } };
use serde_json::Value;
use std::error::Error as StdError;
use std::time::Duration;

use super::ChatError;

/// Status line and raw body of an HTTP exchange, before any interpretation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub reason: Option<String>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Posts a JSON body with a bearer token and hands back whatever came back.
///
/// Implementations only fail with [`ChatError::ConnectionError`]; status
/// codes are left for the caller to classify.
#[async_trait]
pub trait JsonTransport: Send + Sync {
    async fn post_json(
        &self,
        url: &str,
        credential: &str,
        body: &Value
    ) -> Result<HttpResponse, ChatError>;
}

pub struct ReqwestTransport {
    http: HttpClient,
}

impl ReqwestTransport {
    pub fn new(timeout: Option<Duration>) -> Result<Self, ChatError> {
        let mut builder = HttpClient::builder();
        if let Some(t) = timeout {
            builder = builder.timeout(t);
        }
        let http = builder.build().map_err(|e| ChatError::ConnectionError(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl JsonTransport for ReqwestTransport {
    async fn post_json(
        &self,
        url: &str,
        credential: &str,
        body: &Value
    ) -> Result<HttpResponse, ChatError> {
        let auth = HeaderValue::from_str(&format!("Bearer {}", credential)).map_err(
            |_| ChatError::InvalidCredential
        )?;

        let resp = self.http
            .post(url)
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .header(AUTHORIZATION, auth)
            .json(body)
            .send().await
            .map_err(|e| ChatError::ConnectionError(describe(&e)))?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| ChatError::ConnectionError(describe(&e)))?;
        debug!("POST {} -> {} ({} bytes)", url, status, body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
        })
    }
}

/// reqwest's own message hides the cause ("error sending request"), so the
/// source chain is appended.
fn describe(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
