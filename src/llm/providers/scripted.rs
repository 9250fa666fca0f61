//! Test provider that returns a fixed outcome for every prompt.

use crate::llm::{ChatReply, ProviderError};

#[derive(Debug, Clone)]
pub struct ScriptedProvider {
    outcome: Result<ChatReply, String>,
}

impl ScriptedProvider {
    pub fn reply(reply: ChatReply) -> Self {
        Self { outcome: Ok(reply) }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self { outcome: Err(message.into()) }
    }

    pub async fn complete(&self, _prompt: &str) -> Result<ChatReply, ProviderError> {
        self.outcome.clone().map_err(ProviderError::Request)
    }
}
