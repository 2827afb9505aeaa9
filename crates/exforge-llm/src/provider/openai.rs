//! OpenAI provider implementation

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::{api_key_from_env, http_client, LLMProvider, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completions provider; also works with compatible endpoints
pub struct OpenAIProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create from the `OPENAI_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env("OPENAI_API_KEY")?)
    }

    /// Create with a custom base URL (e.g. Azure OpenAI) and timeout
    pub fn with_options(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into(),
            client: http_client(timeout)?,
        })
    }
}

#[async_trait]
impl LLMClient for OpenAIProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        let mut messages = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({
                "role": "system",
                "content": system
            }));
        }
        messages.push(json!({
            "role": "user",
            "content": request.prompt
        }));

        let mut body = json!({
            "model": request.model,
            "messages": messages,
        });
        if let Some(max_tokens) = request.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        tracing::debug!(
            provider = "openai",
            model = %request.model,
            stage = request.stage.as_deref().unwrap_or("-"),
            "sending model request"
        );

        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::ApiCallFailed(format!("OpenAI API call failed: {}", e)))?;

        let status = resp.status();
        let resp_text = resp
            .text()
            .await
            .map_err(|e| LLMError::ApiCallFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LLMError::ApiCallFailed(format!(
                "OpenAI API error ({}): {}",
                status, resp_text
            )));
        }

        let resp_json: serde_json::Value = serde_json::from_str(&resp_text)?;

        let content = resp_json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("No content in response".to_string()))?;

        let finish_reason = resp_json["choices"][0]["finish_reason"]
            .as_str()
            .unwrap_or("stop");

        let tokens_used = resp_json["usage"]["total_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(LLMResponse::new(content, request.model)
            .with_tokens(tokens_used)
            .with_finish_reason(finish_reason))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

impl LLMProvider for OpenAIProvider {
    fn provider_name(&self) -> &str {
        "OpenAI"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIProvider::new("test-key").unwrap();
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.provider_name(), "OpenAI");
    }

    #[test]
    fn test_custom_base_url() {
        let provider = OpenAIProvider::with_options(
            "k",
            "http://localhost:8080/v1",
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(provider.base_url, "http://localhost:8080/v1");
    }
}
