//! Anthropic provider implementation

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::{api_key_from_env, http_client, LLMProvider, DEFAULT_TIMEOUT};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic messages API provider
pub struct AnthropicProvider {
    api_key: String,
    base_url: String,
    client: Client,
}

impl AnthropicProvider {
    /// Create a new Anthropic provider
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, DEFAULT_BASE_URL, DEFAULT_TIMEOUT)
    }

    /// Create from the `ANTHROPIC_API_KEY` environment variable
    pub fn from_env() -> Result<Self> {
        Self::new(api_key_from_env("ANTHROPIC_API_KEY")?)
    }

    /// Create with a custom base URL and request timeout
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
impl LLMClient for AnthropicProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        let mut body = json!({
            "model": request.model,
            "messages": [{
                "role": "user",
                "content": request.prompt
            }],
            "max_tokens": request.max_tokens.unwrap_or(4096),
        });

        if let Some(system) = &request.system {
            body["system"] = json!(system);
        }
        if let Some(temperature) = request.temperature {
            body["temperature"] = json!(temperature);
        }

        tracing::debug!(
            provider = "anthropic",
            model = %request.model,
            stage = request.stage.as_deref().unwrap_or("-"),
            "sending model request"
        );

        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LLMError::ApiCallFailed(format!("Anthropic API call failed: {}", e)))?;

        let status = resp.status();
        let resp_text = resp
            .text()
            .await
            .map_err(|e| LLMError::ApiCallFailed(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            return Err(LLMError::ApiCallFailed(format!(
                "Anthropic API error ({}): {}",
                status, resp_text
            )));
        }

        let resp_json: serde_json::Value = serde_json::from_str(&resp_text)?;

        let content_blocks = resp_json["content"]
            .as_array()
            .ok_or_else(|| LLMError::InvalidResponse("No content in response".to_string()))?;

        // thinking and tool blocks are not used by synthesis
        let content: String = content_blocks
            .iter()
            .filter(|b| b["type"].as_str() == Some("text"))
            .filter_map(|b| b["text"].as_str())
            .collect();

        let finish_reason = resp_json["stop_reason"].as_str().unwrap_or("end_turn");

        let tokens_used = resp_json["usage"]["input_tokens"].as_u64().unwrap_or(0) as u32
            + resp_json["usage"]["output_tokens"].as_u64().unwrap_or(0) as u32;

        Ok(LLMResponse::new(content, request.model)
            .with_tokens(tokens_used)
            .with_finish_reason(finish_reason))
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}

impl LLMProvider for AnthropicProvider {
    fn provider_name(&self) -> &str {
        "Anthropic"
    }
}
