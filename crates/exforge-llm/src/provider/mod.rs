//! LLM provider implementations

use crate::client::LLMClient;

/// LLM provider trait
pub trait LLMProvider: LLMClient {
    /// Get the provider name
    fn provider_name(&self) -> &str;
}

mod anthropic;
mod mock;
mod openai;

pub use anthropic::AnthropicProvider;
pub use mock::{MockProvider, MockReply};
pub use openai::OpenAIProvider;

use crate::error::{LLMError, Result};
use std::time::Duration;

/// Default timeout applied to hosted provider HTTP calls
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Read an API key from the environment
pub(crate) fn api_key_from_env(var: &str) -> Result<String> {
    match std::env::var(var) {
        Ok(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(LLMError::InvalidConfiguration(format!(
            "environment variable {} is not set",
            var
        ))),
    }
}

pub(crate) fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(LLMError::from)
}
