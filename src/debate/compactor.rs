// History compaction
//
// When the serialised transcript of prior statements exceeds the word budget,
// every argument is shortened by an extractive summarizer at a common keep
// ratio. Order and all non-text fields are preserved.

use anyhow::Result;
use async_trait::async_trait;
use rust_stemmers::{Algorithm, Stemmer};
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::statement::{word_count, Statement};
use crate::config::constants::{COMPACTION_SAFETY_MARGIN_WORDS, MIN_KEEP_RATIO};

/// Summarization capability: shorten `text` to roughly `keep_ratio` of its
/// length. `keep_ratio` is always in `(0, 1]`.
#[async_trait]
pub trait Summarizer: Send + Sync {
    async fn summarize(&self, text: &str, keep_ratio: f64) -> Result<String>;

    fn name(&self) -> &str;
}

/// Keep ratio for a transcript of `total_words` under `word_budget`,
/// clamped to `[MIN_KEEP_RATIO, 1.0]`.
pub fn keep_ratio(word_budget: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 1.0;
    }
    let target = word_budget as f64 - COMPACTION_SAFETY_MARGIN_WORDS as f64;
    (target / total_words as f64).clamp(MIN_KEEP_RATIO, 1.0)
}

pub struct HistoryCompactor {
    summarizer: Arc<dyn Summarizer>,
}

impl HistoryCompactor {
    pub fn new(summarizer: Arc<dyn Summarizer>) -> Self {
        Self { summarizer }
    }

    /// Compact `statements` to fit `word_budget`.
    ///
    /// Within budget the input is returned borrowed and untouched; otherwise
    /// each argument is summarised at the same keep ratio.
    pub async fn compact<'a>(
        &self,
        statements: &'a [Statement],
        word_budget: usize,
    ) -> Result<Cow<'a, [Statement]>> {
        let total = word_count(statements);
        if total <= word_budget {
            tracing::debug!("History at {} words, within budget {}", total, word_budget);
            return Ok(Cow::Borrowed(statements));
        }

        let ratio = keep_ratio(word_budget, total);
        tracing::info!(
            "Compacting {} statements ({} words > {}) at ratio {:.3} via {}",
            statements.len(),
            total,
            word_budget,
            ratio,
            self.summarizer.name()
        );

        let mut compacted = Vec::with_capacity(statements.len());
        for statement in statements {
            let summary = self.summarizer.summarize(&statement.argument, ratio).await?;
            compacted.push(statement.with_argument(summary));
        }
        Ok(Cow::Owned(compacted))
    }

    /// Like `compact`, but a summarizer failure falls back to the
    /// uncompacted history with a warning.
    pub async fn compact_or_original<'a>(
        &self,
        statements: &'a [Statement],
        word_budget: usize,
    ) -> Cow<'a, [Statement]> {
        match self.compact(statements, word_budget).await {
            Ok(compacted) => compacted,
            Err(e) => {
                tracing::warn!("History compaction failed, using full history: {:#}", e);
                Cow::Borrowed(statements)
            }
        }
    }
}

/// Words ignored when scoring sentences
const STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "from", "has", "have", "i",
    "in", "is", "it", "its", "of", "on", "or", "our", "so", "that", "the", "their", "this", "to",
    "was", "we", "were", "will", "with", "you",
];

/// Frequency-based extractive summarizer.
///
/// Sentences are scored by the mean normalised frequency of their stemmed
/// content words; the best `ceil(ratio * n)` are kept in original order.
pub struct ExtractiveSummarizer {
    stemmer: Stemmer,
}

impl ExtractiveSummarizer {
    pub fn new() -> Self {
        Self {
            stemmer: Stemmer::create(Algorithm::English),
        }
    }

    pub fn summarize_text(&self, text: &str, keep_ratio: f64) -> String {
        let sentences = split_sentences(text);
        if sentences.len() <= 1 || keep_ratio >= 1.0 {
            return text.trim().to_string();
        }

        let keep = ((keep_ratio * sentences.len() as f64).ceil() as usize).clamp(1, sentences.len());

        let tokenized: Vec<Vec<String>> = sentences
            .iter()
            .map(|s| self.tokenize_and_stem(s))
            .collect();

        let mut freq: HashMap<&str, f64> = HashMap::new();
        for token in tokenized.iter().flatten() {
            *freq.entry(token.as_str()).or_insert(0.0) += 1.0;
        }
        let max_freq = freq.values().cloned().fold(0.0_f64, f64::max).max(1.0);

        let mut scored: Vec<(usize, f64)> = tokenized
            .iter()
            .enumerate()
            .map(|(idx, tokens)| {
                let score = if tokens.is_empty() {
                    0.0
                } else {
                    tokens
                        .iter()
                        .map(|t| freq.get(t.as_str()).copied().unwrap_or(0.0) / max_freq)
                        .sum::<f64>()
                        / tokens.len() as f64
                };
                (idx, score)
            })
            .collect();

        // Highest score first; earlier sentence wins a tie
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        let mut kept: Vec<usize> = scored.into_iter().take(keep).map(|(idx, _)| idx).collect();
        kept.sort_unstable();

        kept.into_iter()
            .map(|idx| sentences[idx])
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn tokenize_and_stem(&self, text: &str) -> Vec<String> {
        text.to_lowercase()
            .split_whitespace()
            .map(|word| word.chars().filter(|c| c.is_alphanumeric()).collect::<String>())
            .filter(|word| !word.is_empty() && !STOPWORDS.contains(&word.as_str()))
            .map(|word| self.stemmer.stem(&word).to_string())
            .collect()
    }
}

impl Default for ExtractiveSummarizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Summarizer for ExtractiveSummarizer {
    async fn summarize(&self, text: &str, keep_ratio: f64) -> Result<String> {
        Ok(self.summarize_text(text, keep_ratio))
    }

    fn name(&self) -> &str {
        "extractive"
    }
}

/// Split on `.`, `!` or `?` followed by whitespace or end of text.
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((idx, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = match chars.peek() {
                Some((_, next)) => next.is_whitespace(),
                None => true,
            };
            if at_boundary {
                let end = idx + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}
