// Unified request/response types for the hosted model backends
//
// A debate turn is a single user prompt in, plain text out, so these types
// are much smaller than a chat-transcript abstraction would need.

use serde::Serialize;

use crate::config::constants::DEFAULT_MAX_TOKENS;

/// Unified request format for all LLM providers
#[derive(Debug, Clone, Serialize)]
pub struct ProviderRequest {
    /// The fully rendered prompt, sent as a single user message
    pub prompt: String,

    /// Model name (provider-specific); empty means the provider default
    pub model: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl ProviderRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: String::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: None,
        }
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Unified response format
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    /// Generated text, already trimmed
    pub text: String,
    /// Model that actually answered
    pub model: String,
    pub stop_reason: Option<String>,
    /// Provider name ("openai", "gemini")
    pub provider: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let req = ProviderRequest::new("hi")
            .with_model("gpt-4")
            .with_temperature(0.3)
            .with_max_tokens(64);
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.model, "gpt-4");
        assert_eq!(req.temperature, Some(0.3));
        assert_eq!(req.max_tokens, 64);
    }

    #[test]
    fn test_defaults() {
        let req = ProviderRequest::new("hi");
        assert!(req.model.is_empty());
        assert!(req.temperature.is_none());
        assert_eq!(req.max_tokens, DEFAULT_MAX_TOKENS);
    }
}
