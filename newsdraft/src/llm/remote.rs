use anyhow::{Context, Result};
use common::LlmConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{ChatMessage, LlmProvider, LlmRequest, LlmResponse, UsageMetadata};

/// Remote LLM provider using OpenAI-compatible HTTP API
pub struct RemoteLlmProvider {
    base_url: String,
    api_key: Option<String>,
    api_key_env: String,
    model: String,
    default_timeout: Duration,
    max_tokens: Option<usize>,
    temperature: Option<f32>,
    client: reqwest::Client,
}

impl RemoteLlmProvider {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: Some(api_key.into()),
            api_key_env: "OPENAI_API_KEY".to_string(),
            model: model.into(),
            default_timeout: Duration::from_secs(300),
            max_tokens: None,
            temperature: None,
            client: reqwest::Client::new(),
        }
    }

    /// Build from configuration and an already-resolved key.
    /// A missing key is not an error here; each call fails instead.
    pub fn from_config(config: &LlmConfig, api_key: Option<String>) -> Self {
        Self {
            base_url: config.api_url.clone(),
            api_key,
            api_key_env: config.api_key_env.clone(),
            model: config.model.clone(),
            default_timeout: Duration::from_secs(config.timeout_seconds),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl LlmProvider for RemoteLlmProvider {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse> {
        let api_key = self.api_key.as_deref().with_context(|| {
            format!("LLM API key not configured (set {})", self.api_key_env)
        })?;

        let timeout = request
            .timeout_seconds
            .map(Duration::from_secs)
            .unwrap_or(self.default_timeout);

        // Build OpenAI-compatible request
        let req_body = OpenAiRequest {
            model: self.model.clone(),
            messages: request.messages,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        // Make HTTP request with timeout
        let response = tokio::time::timeout(
            timeout,
            self.client
                .post(&self.base_url)
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&req_body)
                .send(),
        )
        .await
        .context("LLM request timed out")?
        .context("LLM HTTP request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, body);
        }

        let resp_body: OpenAiResponse = tokio::time::timeout(timeout, response.json())
            .await
            .context("LLM request timed out")?
            .context("Failed to parse LLM response")?;

        let choice = resp_body
            .choices
            .first()
            .context("LLM response has no choices")?;

        let usage = resp_body.usage.unwrap_or_default();
        let usage = UsageMetadata {
            prompt_tokens: usage.prompt_tokens.unwrap_or(0),
            completion_tokens: usage.completion_tokens.unwrap_or(0),
            total_tokens: usage.total_tokens.unwrap_or(0),
        };

        Ok(LlmResponse {
            content: choice.message.content.clone().unwrap_or_default(),
            usage,
            model: resp_body.model.unwrap_or_else(|| self.model.clone()),
        })
    }
}

// OpenAI API request/response structures
#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    model: Option<String>,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Default, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: Option<usize>,
    #[serde(default)]
    completion_tokens: Option<usize>,
    #[serde(default)]
    total_tokens: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_sampling_options_are_not_serialized() {
        let body = OpenAiRequest {
            model: "o1-2024-12-17".to_string(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("hi")],
            max_tokens: None,
            temperature: None,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "model": "o1-2024-12-17",
                "messages": [
                    {"role": "system", "content": "sys"},
                    {"role": "user", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn missing_usage_parses() {
        let resp: OpenAiResponse = serde_json::from_str(
            r#"{"choices": [{"message": {"role": "assistant", "content": "x"}}]}"#,
        )
        .unwrap();
        assert!(resp.usage.is_none());
        assert_eq!(resp.choices[0].message.content.as_deref(), Some("x"));
    }

    #[tokio::test]
    async fn missing_key_fails_at_call_time() {
        let provider = RemoteLlmProvider::from_config(&LlmConfig::default(), None);
        let err = provider
            .generate(LlmRequest::with_system("sys", "prompt"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }
}
