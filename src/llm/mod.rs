//! LLM chat client.
//!
//! `LlmProvider` is an enum over concrete provider implementations; the
//! [`ChatClient`] on top of it is the error boundary request code talks to.
//! [`ChatClient::chat`] never fails: any provider error comes back as a
//! string starting with [`LLM_ERROR_PREFIX`], which callers may match on.
//! [`ChatClient::try_chat`] is the same call with the error kept typed.
//!
//! Clients are shared immutable capabilities; clone them freely.

pub mod providers;

use std::fmt;

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::AzureOpenAiSettings;

/// Marker that starts every sentinel string returned by [`ChatClient::chat`].
pub const LLM_ERROR_PREFIX: &str = "[LLM Error]";

/// Returns `true` if `reply` is a sentinel produced by a failed call.
pub fn is_llm_error(reply: &str) -> bool {
    reply.starts_with(LLM_ERROR_PREFIX)
}

/// Render an error the way [`ChatClient::chat`] reports it.
pub fn error_sentinel(error: &impl fmt::Display) -> String {
    format!("{LLM_ERROR_PREFIX} {error}")
}

// ── Error ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider not configured: {0}")]
    NotConfigured(String),
    #[error("provider request failed: {0}")]
    Request(String),
}

// ── Reply ─────────────────────────────────────────────────────────────────────

/// One provider response: the reply text when the response carries one,
/// plus the full decoded body.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    pub content: Option<String>,
    pub raw: Value,
}

impl ChatReply {
    /// The reply text, or the whole response rendered as text when there is
    /// no content field.
    pub fn into_text(self) -> String {
        match self.content {
            Some(content) => content,
            None => match self.raw {
                Value::String(s) => s,
                other => other.to_string(),
            },
        }
    }
}

// ── Provider enum ─────────────────────────────────────────────────────────────

/// All available provider backends.
///
/// Adding a backend = new module + new variant + new `complete` arm.
#[derive(Debug, Clone)]
pub enum LlmProvider {
    AzureOpenAi(providers::azure_openai::AzureOpenAiProvider),
    Dummy(providers::dummy::DummyProvider),
    #[cfg(test)]
    Scripted(providers::scripted::ScriptedProvider),
}

impl LlmProvider {
    /// Send `prompt` as a single user message and return the decoded reply.
    pub async fn complete(&self, prompt: &str) -> Result<ChatReply, ProviderError> {
        match self {
            LlmProvider::AzureOpenAi(p) => p.complete(prompt).await,
            LlmProvider::Dummy(p) => p.complete(prompt).await,
            #[cfg(test)]
            LlmProvider::Scripted(p) => p.complete(prompt).await,
        }
    }
}

// ── Client ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct ChatClient {
    provider: LlmProvider,
}

impl ChatClient {
    /// Build the client from settings. Only fails when startup validation is
    /// switched on and credentials are missing, or the HTTP client cannot be
    /// constructed.
    pub fn build(settings: &AzureOpenAiSettings) -> Result<Self, ProviderError> {
        Ok(Self::new(providers::build(settings)?))
    }

    pub fn new(provider: LlmProvider) -> Self {
        Self { provider }
    }

    /// Send `prompt` and return the reply text, keeping failures typed.
    pub async fn try_chat(&self, prompt: &str) -> Result<String, ProviderError> {
        let reply = self.provider.complete(prompt).await?;
        debug!(has_content = reply.content.is_some(), "llm reply received");
        Ok(reply.into_text())
    }

    /// Send `prompt` and return the reply text, or an error sentinel.
    pub async fn chat(&self, prompt: &str) -> String {
        match self.try_chat(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "llm call failed");
                error_sentinel(&e)
            }
        }
    }
}
