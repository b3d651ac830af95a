// OpenAI API provider implementation
//
// Chat-completion family: the prompt goes out as a single user message and
// the first choice's content comes back.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::types::{ProviderRequest, ProviderResponse};
use super::LlmProvider;
use crate::config::constants::REQUEST_TIMEOUT_SECS;

const OPENAI_BASE_URL: &str = "https://api.openai.com";

/// OpenAI API provider
#[derive(Clone)]
pub struct OpenAIProvider {
    client: Client,
    api_key: String,
    base_url: String,
    default_model: String,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider
    pub fn new_openai(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: "gpt-4".to_string(),
        })
    }

    /// Set custom model for this provider
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.default_model = model.into();
        self
    }

    /// Point at a compatible endpoint (proxy, test server)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Convert ProviderRequest to OpenAI API format
    fn to_openai_request(&self, request: &ProviderRequest) -> OpenAIRequest {
        let model = if request.model.is_empty() {
            self.default_model.clone()
        } else {
            request.model.clone()
        };

        OpenAIRequest {
            model,
            messages: vec![OpenAIMessage {
                role: "user".to_string(),
                content: request.prompt.clone(),
            }],
            max_tokens: Some(request.max_tokens),
            temperature: request.temperature,
        }
    }

    /// Convert OpenAI response to ProviderResponse
    fn from_openai_response(&self, response: OpenAIResponse) -> Result<ProviderResponse> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .context("OpenAI returned no choices in response")?;

        let text = choice
            .message
            .content
            .map(|t| t.trim().to_string())
            .unwrap_or_default();
        if text.is_empty() {
            anyhow::bail!("OpenAI returned an empty message");
        }

        Ok(ProviderResponse {
            text,
            model: response.model,
            stop_reason: choice.finish_reason,
            provider: "openai".to_string(),
        })
    }
}

#[async_trait]
impl LlmProvider for OpenAIProvider {
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse> {
        let openai_request = self.to_openai_request(request);
        let url = format!("{}/v1/chat/completions", self.base_url);

        tracing::debug!("Sending request to OpenAI API: {:?}", openai_request);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("content-type", "application/json")
            .json(&openai_request)
            .send()
            .await
            .context("Failed to send request to OpenAI API")?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "OpenAI API request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let openai_response: OpenAIResponse = response
            .json()
            .await
            .context("Failed to parse OpenAI API response")?;

        tracing::debug!("Received response: {:?}", openai_response);

        self.from_openai_response(openai_response)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }
}

// OpenAI API types

#[derive(Debug, Clone, Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Clone, Serialize)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponse {
    model: String,
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct OpenAIResponseMessage {
    content: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openai_provider_creation() {
        let provider = OpenAIProvider::new_openai("test-key".to_string());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_provider_name_and_model() {
        let provider = OpenAIProvider::new_openai("test-key".to_string())
            .unwrap()
            .with_model("gpt-3.5-turbo");
        assert_eq!(provider.name(), "openai");
        assert_eq!(provider.default_model(), "gpt-3.5-turbo");
    }

    #[test]
    fn test_request_uses_default_model_when_unset() {
        let provider = OpenAIProvider::new_openai("k".to_string()).unwrap();
        let req = provider.to_openai_request(&ProviderRequest::new("hello").with_temperature(0.5));
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.messages[0].role, "user");
        assert_eq!(req.temperature, Some(0.5));
    }

    #[test]
    fn test_response_text_is_trimmed() {
        let provider = OpenAIProvider::new_openai("k".to_string()).unwrap();
        let raw: OpenAIResponse = serde_json::from_str(
            r#"{"id":"x","model":"gpt-4","choices":[{"index":0,"message":{"role":"assistant","content":"  Coal is dead.\n"},"finish_reason":"stop"}]}"#,
        )
        .unwrap();
        let resp = provider.from_openai_response(raw).unwrap();
        assert_eq!(resp.text, "Coal is dead.");
        assert_eq!(resp.stop_reason.as_deref(), Some("stop"));
    }

    #[test]
    fn test_response_without_choices_is_error() {
        let provider = OpenAIProvider::new_openai("k".to_string()).unwrap();
        let raw: OpenAIResponse =
            serde_json::from_str(r#"{"id":"x","model":"gpt-4","choices":[]}"#).unwrap();
        assert!(provider.from_openai_response(raw).is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let provider = OpenAIProvider::new_openai("k".to_string())
            .unwrap()
            .with_base_url("http://localhost:1234/");
        assert_eq!(provider.base_url, "http://localhost:1234");
    }
}
