// Unified text-generation interface used by the debate core
//
// The round engine and persona generation only ever need "prompt in, text
// out" at a model name and temperature. `ModelGateway` is the production
// implementation; tests plug in scripted generators.

use async_trait::async_trait;

use crate::config::LlmParams;
use crate::errors::DebateResult;

pub mod gateway;

pub use gateway::{BackendFamily, ModelGateway};

/// A single generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub model_name: String,
    pub temperature: f32,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, model_name: impl Into<String>, temperature: f32) -> Self {
        Self {
            prompt: prompt.into(),
            model_name: model_name.into(),
            temperature,
        }
    }

    /// Request using the session's model name and temperature
    pub fn from_params(prompt: impl Into<String>, params: &LlmParams) -> Self {
        Self::new(prompt, params.model_name.clone(), params.temperature)
    }
}

/// Text generator interface
#[async_trait]
pub trait Generator: Send + Sync {
    /// Generate text for the request. Returns trimmed text.
    ///
    /// Implementations never retry; a failed call is reported once.
    async fn generate(&self, request: &GenerationRequest) -> DebateResult<String>;

    /// Get generator name for logging
    fn name(&self) -> &str;
}
