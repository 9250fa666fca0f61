//! Azure OpenAI chat completion provider.
//!
//! Talks to one deployment:
//! `POST {endpoint}/openai/deployments/{deployment}/chat/completions?api-version={version}`
//! authenticated with the `api-key` header. The prompt goes out as a single
//! user message; nothing is streamed and usage is not tracked.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, trace};

use crate::config::AzureOpenAiSettings;
use crate::llm::{ChatReply, ProviderError};

const API_KEY_HEADER: &str = "api-key";

/// Constructed once at startup, then cheaply cloned because
/// `reqwest::Client` is an `Arc` internally.
#[derive(Clone)]
pub struct AzureOpenAiProvider {
    client: Client,
    /// `None` when no endpoint is configured; calls then fail.
    completions_url: Option<String>,
    api_key: Option<String>,
    deployment: String,
}

impl fmt::Debug for AzureOpenAiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureOpenAiProvider")
            .field("completions_url", &self.completions_url)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("deployment", &self.deployment)
            .finish()
    }
}

impl AzureOpenAiProvider {
    pub fn new(settings: &AzureOpenAiSettings) -> Result<Self, ProviderError> {
        let mut builder = Client::builder();
        if let Some(secs) = settings.timeout_seconds.filter(|&secs| secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| ProviderError::Request(format!("failed to build HTTP client: {e}")))?;

        let completions_url = settings
            .endpoint
            .as_deref()
            .filter(|e| !e.is_empty())
            .map(|endpoint| completions_url(endpoint, &settings.deployment, &settings.api_version));

        Ok(Self {
            client,
            completions_url,
            api_key: settings.api_key.clone().filter(|k| !k.is_empty()),
            deployment: settings.deployment.clone(),
        })
    }

    /// One round-trip: `prompt` in, decoded reply out.
    pub async fn complete(&self, prompt: &str) -> Result<ChatReply, ProviderError> {
        let url = self
            .completions_url
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("AZURE_OPENAI_ENDPOINT is not set".into()))?;
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured("AZURE_OPENAI_API_KEY is not set".into()))?;

        let payload = ChatCompletionRequest {
            messages: vec![Message { role: "user", content: prompt }],
        };

        debug!(deployment = %self.deployment, prompt_len = prompt.len(), "sending LLM request");

        let response = self
            .client
            .post(url)
            .header(API_KEY_HEADER, api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!(deployment = %self.deployment, error = %e, "LLM HTTP request failed (transport)");
                ProviderError::Request(e.to_string())
            })?;

        let response = check_status(response).await?;

        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(format!("failed to read response body: {e}")))?;
        trace!(body = %body, "full LLM response payload");

        parse_reply(&body)
    }
}

/// Join the resource endpoint with the deployment's chat completions path.
pub fn completions_url(endpoint: &str, deployment: &str, api_version: &str) -> String {
    format!(
        "{}/openai/deployments/{deployment}/chat/completions?api-version={api_version}",
        endpoint.trim_end_matches('/'),
    )
}

/// Decode a successful response body. The reply text is
/// `choices[0].message.content` when that is a string.
fn parse_reply(body: &str) -> Result<ChatReply, ProviderError> {
    let raw: Value = serde_json::from_str(body).map_err(|e| {
        error!(error = %e, "failed to deserialize LLM response");
        ProviderError::Request(format!("failed to parse response body: {e}"))
    })?;
    let content = raw
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .map(str::to_owned);
    Ok(ChatReply { content, raw })
}

// ── Private wire types ────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    messages: Vec<Message<'a>>,
}

// Error envelope used by Azure OpenAI.
#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
    #[serde(default)]
    code: Option<Value>,
}

/// Consume the response and return it if successful, or a structured error.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read error body>".to_string());

    let message = status_message(status, &body);
    error!(%status, %message, "LLM request returned HTTP error");
    Err(ProviderError::Request(message))
}

fn status_message(status: reqwest::StatusCode, body: &str) -> String {
    if let Ok(env) = serde_json::from_str::<ErrorEnvelope>(body) {
        let code = env
            .error
            .code
            .map(|v| match v {
                Value::String(s) => format!(" [code={s}]"),
                other => format!(" [code={other}]"),
            })
            .unwrap_or_default();
        format!("HTTP {status}{code}: {}", env.error.message)
    } else {
        format!("HTTP {status}: {body}")
    }
}
