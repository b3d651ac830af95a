// Configuration structs

use serde::{Deserialize, Serialize};

use super::constants::*;
use crate::debate::template::{placeholder, PromptTemplate, Substitutions};
use crate::errors::{DebateError, DebateResult};

/// Prompt templates, one per kind of model call.
///
/// Templates use bracket placeholders such as `[TOPIC]` or `[HISTORY]`;
/// see `crate::debate::template`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    /// Uses [TOPIC], [NUM_PERSONAS]
    pub persona_creation: String,
    /// Uses [TOPIC], [CURRENT_PERSONAS]
    pub persona_addition: String,
    /// Uses [TOPIC], [NAME], [DESC], [LIMITER]
    pub debate_start: String,
    /// Uses [TOPIC], [NAME], [DESC], [HISTORY], [LIMITER]
    pub debate: String,
    /// Uses [RESPONSE_LENGTH]
    pub response_length: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            persona_creation: DEFAULT_PERSONA_CREATION_PROMPT.to_string(),
            persona_addition: DEFAULT_PERSONA_ADDITION_PROMPT.to_string(),
            debate_start: DEFAULT_DEBATE_START_PROMPT.to_string(),
            debate: DEFAULT_DEBATE_PROMPT.to_string(),
            response_length: DEFAULT_RESPONSE_LENGTH_PROMPT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateParams {
    pub num_debate_rounds: u32,
    /// History accumulates turn by turn instead of round by round
    pub enable_continuous_mode: bool,
    /// Transcript size (words) above which prior statements get compacted
    pub transcript_word_limit: usize,
    pub limit_response_length: bool,
    /// Free-form length phrase, e.g. "5 sentences"
    pub response_length: String,
    pub num_personas: u32,
}

impl Default for DebateParams {
    fn default() -> Self {
        Self {
            num_debate_rounds: DEFAULT_NUM_ROUNDS,
            enable_continuous_mode: false,
            transcript_word_limit: DEFAULT_TRANSCRIPT_WORD_LIMIT,
            limit_response_length: true,
            response_length: DEFAULT_RESPONSE_LENGTH.to_string(),
            num_personas: DEFAULT_NUM_PERSONAS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmParams {
    pub model_name: String,
    pub temperature: f32,
}

impl Default for LlmParams {
    fn default() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

/// Optional API keys; environment variables fill whatever is missing.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gemini: Option<String>,
}

impl ApiKeys {
    /// Fill missing keys from OPENAI_API_KEY / GEMINI_API_KEY / GOOGLE_API_KEY.
    pub fn with_env_fallback(mut self) -> Self {
        if self.openai.is_none() {
            self.openai = non_empty_env("OPENAI_API_KEY");
        }
        if self.gemini.is_none() {
            self.gemini = non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"));
        }
        self
    }
}

// Keys never show up in logs
impl std::fmt::Debug for ApiKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeys")
            .field("openai", &self.openai.as_ref().map(|_| "<set>"))
            .field("gemini", &self.gemini.as_ref().map(|_| "<set>"))
            .finish()
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Session configuration. Loaded once; the debate core only reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    pub prompts: PromptTemplates,
    pub debate_params: DebateParams,
    pub llm_params: LlmParams,
    pub api_keys: ApiKeys,
}

impl DebateConfig {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> DebateResult<()> {
        let temperature = self.llm_params.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            return Err(DebateError::Config(format!(
                "temperature {} is out of range (0.0 - 2.0)",
                temperature
            )));
        }

        if self.llm_params.model_name.trim().is_empty() {
            return Err(DebateError::Config("model_name must not be empty".to_string()));
        }

        if self.debate_params.num_debate_rounds == 0 {
            return Err(DebateError::Config(
                "num_debate_rounds must be greater than 0".to_string(),
            ));
        }

        if self.debate_params.num_personas == 0 {
            return Err(DebateError::Config(
                "num_personas must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The response-length clause substituted for `[LIMITER]`.
    ///
    /// Empty when length limiting is disabled, so the placeholder vanishes
    /// from the rendered prompt.
    pub fn limiter_clause(&self) -> String {
        if !self.debate_params.limit_response_length {
            return String::new();
        }
        let subs = Substitutions::new().with(
            placeholder::RESPONSE_LENGTH,
            self.debate_params.response_length.as_str(),
        );
        PromptTemplate::compile(&self.prompts.response_length).render(&subs)
    }
}
