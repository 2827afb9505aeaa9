//! Scripted LLM provider for tests and dry runs

use crate::client::{LLMClient, LLMRequest, LLMResponse};
use crate::error::{LLMError, Result};
use crate::provider::LLMProvider;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// One scripted reply
#[derive(Debug, Clone, PartialEq)]
pub enum MockReply {
    /// Return this content
    Content(String),
    /// Fail the call with this message
    Failure(String),
}

/// Mock LLM provider
///
/// Replies are served from a script in call order. Once the script is empty
/// the fallback response is used; without a fallback the call fails with
/// `LLMError::ScriptExhausted`. Every request is recorded.
pub struct MockProvider {
    name: String,
    script: Mutex<VecDeque<MockReply>>,
    fallback: Option<String>,
    requests: Mutex<Vec<LLMRequest>>,
}

impl MockProvider {
    /// Create a mock that always answers with a fixed placeholder
    pub fn new() -> Self {
        Self::with_response("Mock LLM response")
    }

    /// Create a mock that always answers with `response`
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback: Some(response.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Create a mock that plays `replies` in order, then fails
    pub fn scripted(replies: Vec<MockReply>) -> Self {
        Self {
            name: "mock".to_string(),
            script: Mutex::new(replies.into()),
            fallback: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<LLMRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LLMClient for MockProvider {
    async fn call(&self, request: LLMRequest) -> Result<LLMResponse> {
        let model = request.model.clone();
        let call_number = {
            let mut requests = self
                .requests
                .lock()
                .map_err(|_| LLMError::ApiCallFailed("mock request log poisoned".into()))?;
            requests.push(request);
            requests.len()
        };

        let next = self
            .script
            .lock()
            .map_err(|_| LLMError::ApiCallFailed("mock script poisoned".into()))?
            .pop_front();

        let content = match next {
            Some(MockReply::Content(content)) => content,
            Some(MockReply::Failure(message)) => return Err(LLMError::ApiCallFailed(message)),
            None => match &self.fallback {
                Some(content) => content.clone(),
                None => return Err(LLMError::ScriptExhausted(call_number - 1)),
            },
        };

        Ok(LLMResponse::new(content, model)
            .with_tokens(10)
            .with_finish_reason("stop"))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl LLMProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "Mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_provider_default() {
        let provider = MockProvider::new();
        let request = LLMRequest::new("Test", "mock-model");

        let response = provider.call(request).await.unwrap();
        assert_eq!(response.content, "Mock LLM response");
        assert_eq!(response.model, "mock-model");
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test]
    async fn test_scripted_replies_in_order() {
        let provider = MockProvider::scripted(vec![
            MockReply::Content("first".into()),
            MockReply::Failure("rate limited".into()),
        ]);

        let first = provider.call(LLMRequest::new("a", "m")).await.unwrap();
        assert_eq!(first.content, "first");

        let second = provider.call(LLMRequest::new("b", "m")).await;
        assert!(matches!(second, Err(LLMError::ApiCallFailed(ref m)) if m == "rate limited"));

        let third = provider.call(LLMRequest::new("c", "m")).await;
        assert!(matches!(third, Err(LLMError::ScriptExhausted(2))));

        let prompts: Vec<String> = provider.requests().into_iter().map(|r| r.prompt).collect();
        assert_eq!(prompts, vec!["a", "b", "c"]);
    }
}
