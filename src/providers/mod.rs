// Hosted LLM backends
//
// Each backend family (chat-completion style, generative-text style) gets
// one provider implementing `LlmProvider`. The model gateway in
// `crate::generators` picks the provider for a model name.

use anyhow::Result;
use async_trait::async_trait;

pub mod gemini;
pub mod openai;
pub mod types;

pub use gemini::GeminiProvider;
pub use openai::OpenAIProvider;
pub use types::{ProviderRequest, ProviderResponse};

/// Trait for LLM providers
///
/// Calls are single-shot: no retries happen at this layer.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a prompt and wait for the complete response
    async fn send_message(&self, request: &ProviderRequest) -> Result<ProviderResponse>;

    /// Get the provider name (e.g., "openai", "gemini")
    fn name(&self) -> &str;

    /// Get the default model for this provider
    fn default_model(&self) -> &str;
}
