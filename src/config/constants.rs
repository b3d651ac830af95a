// Project-wide constants
//
// Centralised here so default prompts and tuning values have one source of
// truth. Import via `use crate::config::constants::*;`.

/// Words subtracted from the transcript limit before computing the keep
/// ratio for compaction.
pub const COMPACTION_SAFETY_MARGIN_WORDS: usize = 100;

/// Smallest keep ratio ever requested from a summarizer. Budgets at or below
/// the safety margin would otherwise ask for a zero or negative ratio.
pub const MIN_KEEP_RATIO: f64 = 0.05;

/// Default maximum tokens for a single debate turn.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Timeout applied by the HTTP client of every provider.
pub const REQUEST_TIMEOUT_SECS: u64 = 120;

/// Directory under $HOME holding the user config.
pub const CONFIG_DIR_NAME: &str = ".roundtable";

pub const DEFAULT_MODEL_NAME: &str = "gpt-4";
pub const DEFAULT_TEMPERATURE: f32 = 0.8;
pub const DEFAULT_NUM_ROUNDS: u32 = 2;
pub const DEFAULT_NUM_PERSONAS: u32 = 3;
pub const DEFAULT_TRANSCRIPT_WORD_LIMIT: usize = 2500;
pub const DEFAULT_RESPONSE_LENGTH: &str = "5 sentences";

pub const DEFAULT_PERSONA_CREATION_PROMPT: &str = "Given the topic [TOPIC], create a roundtable debate of different personas \
to expertly show key perspectives on the issue. Output the personas as a list of JSON objects. \
Each JSON object should have the following structure: \
{\"title\": \"Name of the Persona\", \"description\": \"Brief description of the persona\", \
\"emoji\": \"A single emoji that represents the persona\"}. \
Ensure that the output is formatted as valid JSON. Please generate exactly [NUM_PERSONAS] personas.";

pub const DEFAULT_PERSONA_ADDITION_PROMPT: &str = "A roundtable debate on the topic [TOPIC] already has these personas: \
[CURRENT_PERSONAS]. Create exactly one additional persona whose perspective is not yet represented. \
Output a single JSON object with the structure \
{\"title\": \"Name of the Persona\", \"description\": \"Brief description of the persona\", \
\"emoji\": \"A single emoji that represents the persona\"} and nothing else.";

pub const DEFAULT_DEBATE_START_PROMPT: &str = "You are in a roundtable debate on the topic [TOPIC]. \
You are [NAME], who is [DESC]. \
Please start the debate by concisely presenting your argument for your stance on the topic. [LIMITER]";

pub const DEFAULT_DEBATE_PROMPT: &str = "You are in a continuing roundtable debate on the topic [TOPIC]. \
You are [NAME], who is [DESC]. \
Here is the transcript of the debate so far: [HISTORY] \
Please continue to debate the others, concisely supporting your stance on the topic. [LIMITER]";

pub const DEFAULT_RESPONSE_LENGTH_PROMPT: &str = "Limit your response to [RESPONSE_LENGTH].";
