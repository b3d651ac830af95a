// Model gateway
//
// Dispatches a generation request to a backend family chosen by substring
// match on the model name. Stateless apart from the provider handles.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::{GenerationRequest, Generator};
use crate::config::constants::DEFAULT_MAX_TOKENS;
use crate::config::ApiKeys;
use crate::errors::{DebateError, DebateResult};
use crate::providers::{GeminiProvider, LlmProvider, OpenAIProvider, ProviderRequest};

/// Backend families known to the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BackendFamily {
    /// OpenAI-style chat completions ("gpt-*")
    ChatCompletion,
    /// Google generative-text models ("gemini-*")
    GenerativeText,
}

impl BackendFamily {
    /// Resolve a family by substring match on the model name (case-insensitive).
    pub fn from_model_name(model_name: &str) -> Option<Self> {
        let lower = model_name.to_lowercase();
        if lower.contains("gpt") {
            Some(Self::ChatCompletion)
        } else if lower.contains("gemini") {
            Some(Self::GenerativeText)
        } else {
            None
        }
    }

    pub fn provider_name(&self) -> &'static str {
        match self {
            Self::ChatCompletion => "openai",
            Self::GenerativeText => "gemini",
        }
    }

    fn key_env_var(&self) -> &'static str {
        match self {
            Self::ChatCompletion => "OPENAI_API_KEY",
            Self::GenerativeText => "GEMINI_API_KEY",
        }
    }
}

/// Routes prompts to the provider registered for the model's family.
pub struct ModelGateway {
    providers: HashMap<BackendFamily, Arc<dyn LlmProvider>>,
    max_tokens: u32,
}

impl ModelGateway {
    /// Gateway with no providers; register them with `with_provider`.
    pub fn empty() -> Self {
        Self {
            providers: HashMap::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    /// Build providers for every family that has an API key.
    pub fn from_api_keys(keys: &ApiKeys) -> DebateResult<Self> {
        let mut gateway = Self::empty();

        if let Some(key) = &keys.openai {
            let provider = OpenAIProvider::new_openai(key.clone())
                .map_err(|e| DebateError::Config(format!("{:#}", e)))?;
            gateway = gateway.with_provider(BackendFamily::ChatCompletion, Arc::new(provider));
        }

        if let Some(key) = &keys.gemini {
            let provider = GeminiProvider::new(key.clone())
                .map_err(|e| DebateError::Config(format!("{:#}", e)))?;
            gateway = gateway.with_provider(BackendFamily::GenerativeText, Arc::new(provider));
        }

        tracing::debug!(
            "Model gateway ready with {} provider(s)",
            gateway.providers.len()
        );
        Ok(gateway)
    }

    pub fn with_provider(mut self, family: BackendFamily, provider: Arc<dyn LlmProvider>) -> Self {
        self.providers.insert(family, provider);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn has_provider(&self, family: BackendFamily) -> bool {
        self.providers.contains_key(&family)
    }
}

#[async_trait]
impl Generator for ModelGateway {
    async fn generate(&self, request: &GenerationRequest) -> DebateResult<String> {
        let family = BackendFamily::from_model_name(&request.model_name).ok_or_else(|| {
            DebateError::UnsupportedModel {
                model: request.model_name.clone(),
            }
        })?;

        let provider = self.providers.get(&family).ok_or_else(|| {
            DebateError::upstream(
                family.provider_name(),
                format!("no API key configured (set {})", family.key_env_var()),
            )
        })?;

        let provider_request = ProviderRequest::new(request.prompt.as_str())
            .with_model(request.model_name.as_str())
            .with_temperature(request.temperature)
            .with_max_tokens(self.max_tokens);

        tracing::debug!(
            "Dispatching {} prompt chars to {} ({})",
            request.prompt.len(),
            provider.name(),
            request.model_name
        );

        let response = provider
            .send_message(&provider_request)
            .await
            .map_err(|e| DebateError::upstream(provider.name(), format!("{:#}", e)))?;

        Ok(response.text.trim().to_string())
    }

    fn name(&self) -> &str {
        "model-gateway"
    }
}
