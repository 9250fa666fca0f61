//! Dummy LLM provider. Echoes the prompt back prefixed with `[echo]`.
//! Selected with `LLM_PROVIDER=dummy` to run the service without Azure
//! credentials.

use serde_json::json;

use crate::llm::{ChatReply, ProviderError};

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, prompt: &str) -> Result<ChatReply, ProviderError> {
        let content = format!("[echo] {prompt}");
        Ok(ChatReply {
            raw: json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }),
            content: Some(content),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.complete("hello").await.unwrap().into_text(), "[echo] hello");
    }

    #[tokio::test]
    async fn complete_empty_input() {
        let reply = DummyProvider.complete("").await.unwrap();
        assert_eq!(reply.content.as_deref(), Some("[echo] "));
        assert_eq!(reply.raw["choices"][0]["message"]["content"], "[echo] ");
    }
}
