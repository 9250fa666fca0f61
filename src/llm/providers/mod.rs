//! LLM provider implementations.
//!
//! `build(settings)` is the factory, called once at startup.
//! Adding a new backend = new module + new match arm.

pub mod azure_openai;
pub mod dummy;
#[cfg(test)]
pub mod scripted;

use tracing::{info, warn};

use crate::config::{AzureOpenAiSettings, LlmBackend};
use crate::llm::{LlmProvider, ProviderError};

/// Construct the configured `LlmProvider`.
///
/// Missing Azure credentials are rejected here only when
/// `validate_on_startup` is set; otherwise they are logged and the first
/// call reports them.
pub fn build(settings: &AzureOpenAiSettings) -> Result<LlmProvider, ProviderError> {
    match settings.backend {
        LlmBackend::Dummy => {
            info!("llm provider: dummy");
            Ok(LlmProvider::Dummy(dummy::DummyProvider))
        }
        LlmBackend::AzureOpenAi => {
            let missing = missing_credentials(settings);
            if !missing.is_empty() {
                let joined = missing.join(", ");
                if settings.validate_on_startup {
                    return Err(ProviderError::NotConfigured(format!("missing {joined}")));
                }
                warn!(missing = %joined, "azure openai credentials incomplete; calls will fail");
            }
            let p = azure_openai::AzureOpenAiProvider::new(settings)?;
            info!(deployment = %settings.deployment, api_version = %settings.api_version, "llm provider: azure openai");
            Ok(LlmProvider::AzureOpenAi(p))
        }
    }
}

fn missing_credentials(settings: &AzureOpenAiSettings) -> Vec<&'static str> {
    [
        ("AZURE_OPENAI_API_KEY", settings.api_key.as_deref()),
        ("AZURE_OPENAI_ENDPOINT", settings.endpoint.as_deref()),
    ]
    .into_iter()
    .filter(|(_, value)| value.is_none_or(str::is_empty))
    .map(|(name, _)| name)
    .collect()
}
