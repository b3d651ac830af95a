// Error taxonomy for the debate core
//
// Fatal failures abort the current operation (persona generation or a single
// turn) and are returned as `DebateError`. Non-fatal problems are collected as
// `ValidationWarning`s and surfaced alongside the result.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Longest slice of raw upstream text echoed in `Display` output.
const RAW_PREVIEW_CHARS: usize = 200;

#[derive(Debug, Error)]
pub enum DebateError {
    /// Model output did not contain well-formed JSON where it was required.
    #[error("could not parse model output: {reason} (raw: {})", preview(.raw))]
    Parse { reason: String, raw: String },

    /// The configured model name matches no known backend family.
    #[error("model '{model}' is not supported (expected a gpt-* or gemini-* model)")]
    UnsupportedModel { model: String },

    /// The backend call failed (network, auth, quota ...).
    #[error("{provider} request failed: {detail}")]
    Upstream { provider: String, detail: String },

    /// A round needs at least two participants.
    #[error("a debate round needs at least 2 participating personas, got {count}")]
    InsufficientParticipants { count: usize },

    /// A round index was requested out of sequence.
    #[error("round {requested} cannot be started; next round is {next}")]
    RoundOutOfOrder { requested: usize, next: usize },

    /// No statement exists at the given position.
    #[error("no statement at round {round}, position {index}")]
    UnknownStatement { round: usize, index: usize },

    /// Configuration could not be read or is invalid.
    #[error("configuration error: {0}")]
    Config(String),
}

impl DebateError {
    pub fn parse(reason: impl Into<String>, raw: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
            raw: raw.into(),
        }
    }

    pub fn upstream(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Upstream {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Full raw upstream text attached to this error, if any.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Self::Parse { raw, .. } => Some(raw),
            Self::Upstream { detail, .. } => Some(detail),
            _ => None,
        }
    }
}

pub type DebateResult<T> = std::result::Result<T, DebateError>;

/// Non-fatal problems found before a round or after a persona edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationWarning {
    EmptyTitle { position: usize },
    EmptyDescription { title: String },
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle { position } => {
                write!(f, "persona #{} does not have a title", position + 1)
            }
            Self::EmptyDescription { title } => {
                write!(f, "{} does not have a description", title)
            }
        }
    }
}

fn preview(raw: &str) -> String {
    if raw.chars().count() <= RAW_PREVIEW_CHARS {
        raw.to_string()
    } else {
        let head: String = raw.chars().take(RAW_PREVIEW_CHARS).collect();
        format!("{}…", head)
    }
}
