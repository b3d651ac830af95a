// Round engine
//
// Runs one debate round per invocation. Turns are strictly sequential; each
// persona's turn is skipped when the round already holds a statement under
// its title, so a re-invoked round resumes where it stopped and never asks
// the model twice for the same (persona, round).

use async_trait::async_trait;
use std::sync::Arc;

use super::compactor::HistoryCompactor;
use super::events::{emit, DebateEvent, EventSender};
use super::persona::{validate_participants, Persona};
use super::statement::{render_transcript, RoundHistory, Statement};
use super::template::{placeholder, PromptTemplate, Substitutions};
use crate::config::DebateConfig;
use crate::errors::{DebateError, DebateResult, ValidationWarning};
use crate::generators::{GenerationRequest, Generator};

/// Hook applied to each fresh argument before it is recorded, e.g. to
/// rewrite it with citations. An error aborts the turn.
#[async_trait]
pub trait StatementPostProcessor: Send + Sync {
    async fn process(&self, persona: &Persona, argument: String) -> DebateResult<String>;

    fn name(&self) -> &str;
}

/// What one invocation did.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundOutcome {
    pub round: usize,
    /// Titles generated during this invocation, in speaking order
    pub produced: Vec<String>,
    /// Titles that already had a statement and were skipped
    pub resumed: Vec<String>,
    pub warnings: Vec<ValidationWarning>,
}

pub struct RoundEngine {
    generator: Arc<dyn Generator>,
    compactor: HistoryCompactor,
    post_processor: Option<Arc<dyn StatementPostProcessor>>,
    events: Option<EventSender>,
}

impl RoundEngine {
    pub fn new(generator: Arc<dyn Generator>, compactor: HistoryCompactor) -> Self {
        Self {
            generator,
            compactor,
            post_processor: None,
            events: None,
        }
    }

    pub fn with_post_processor(mut self, processor: Arc<dyn StatementPostProcessor>) -> Self {
        self.post_processor = Some(processor);
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.events = Some(events);
        self
    }

    pub fn generator(&self) -> &Arc<dyn Generator> {
        &self.generator
    }

    /// Round index the next invocation works on: the last round if it is
    /// still missing participants, otherwise a new one.
    pub fn target_round(history: &RoundHistory, participants: &[Persona]) -> usize {
        match history.last_round() {
            Some((index, _)) if !history.is_round_complete(index, participants) => index,
            _ => history.len(),
        }
    }

    /// Advance the debate by one round, or finish the in-progress one.
    ///
    /// `participants` must already be in the store's stable order. Fewer than
    /// two participants fails before any model call.
    pub async fn run_round(
        &self,
        topic: &str,
        participants: &[Persona],
        config: &DebateConfig,
        history: &mut RoundHistory,
    ) -> DebateResult<RoundOutcome> {
        let round = Self::target_round(history, participants);
        self.run_round_at(round, topic, participants, config, history)
            .await
    }

    /// Run (or re-run) a specific round. Existing statements are kept and
    /// only missing personas are generated, so re-running a complete round
    /// makes no model calls. `round` may be at most one past the last round.
    pub async fn run_round_at(
        &self,
        round: usize,
        topic: &str,
        participants: &[Persona],
        config: &DebateConfig,
        history: &mut RoundHistory,
    ) -> DebateResult<RoundOutcome> {
        if participants.len() < 2 {
            return Err(DebateError::InsufficientParticipants {
                count: participants.len(),
            });
        }
        if round > history.len() {
            return Err(DebateError::RoundOutOfOrder {
                requested: round,
                next: history.len(),
            });
        }

        let warnings = validate_participants(participants);
        for warning in &warnings {
            tracing::warn!("{}", warning);
            emit(self.events.as_ref(), DebateEvent::Warning(warning.clone()));
        }

        if round == history.len() {
            history.start_round(round)?;
        }

        let continuous = config.debate_params.enable_continuous_mode;
        let budget = config.debate_params.transcript_word_limit;
        let start_template = PromptTemplate::compile(&config.prompts.debate_start);
        let debate_template = PromptTemplate::compile(&config.prompts.debate);
        let limiter = config.limiter_clause();

        let mut outcome = RoundOutcome {
            round,
            produced: Vec::new(),
            resumed: Vec::new(),
            warnings,
        };

        for persona in participants {
            if history.find_by_title(round, &persona.title).is_some() {
                outcome.resumed.push(persona.title.clone());
            }
        }
        let pending = outcome.resumed.len() < participants.len();

        // Discrete mode sees only the previous round, compacted once and
        // only when someone still has to speak
        let prior_round_text = if !continuous && round > 0 && pending {
            let prior = history.round(round - 1).unwrap_or_default();
            let compacted = self.compactor.compact_or_original(prior, budget).await;
            Some(render_transcript(&compacted))
        } else {
            None
        };

        tracing::info!(
            "Round {} ({} mode): {} participants, {} already spoken",
            round + 1,
            if continuous { "continuous" } else { "discrete" },
            participants.len(),
            outcome.resumed.len()
        );
        emit(
            self.events.as_ref(),
            DebateEvent::RoundStarted {
                round,
                resumed: outcome.resumed.len(),
            },
        );

        for persona in participants {
            if history.find_by_title(round, &persona.title).is_some() {
                tracing::debug!("{} already spoke in round {}, skipping", persona.title, round + 1);
                continue;
            }

            let history_text = if continuous {
                let so_far = history.statements_through(round);
                if so_far.is_empty() {
                    None
                } else {
                    let compacted = self.compactor.compact_or_original(&so_far, budget).await;
                    Some(render_transcript(&compacted))
                }
            } else {
                prior_round_text.clone()
            };

            let mut subs = Substitutions::new()
                .with(placeholder::TOPIC, topic)
                .with(placeholder::NAME, persona.title.as_str())
                .with(placeholder::DESC, persona.description.as_str())
                .with(placeholder::LIMITER, limiter.as_str());
            let template = match history_text {
                Some(text) => {
                    subs.set(placeholder::HISTORY, text);
                    &debate_template
                }
                None => &start_template,
            };
            let prompt = template.render(&subs);

            tracing::debug!("Prompt for {}: {}", persona.title, prompt);
            let request = GenerationRequest::from_params(prompt, &config.llm_params);
            let mut argument = self.generator.generate(&request).await?;

            if let Some(processor) = &self.post_processor {
                argument = processor.process(persona, argument).await?;
            }

            let statement = Statement::new(persona, argument);
            let index = history.push(round, statement.clone())?;
            tracing::info!("{} spoke in round {}", persona.title, round + 1);

            emit(
                self.events.as_ref(),
                DebateEvent::StatementProduced {
                    round,
                    index,
                    statement,
                },
            );
            outcome.produced.push(persona.title.clone());
        }

        emit(
            self.events.as_ref(),
            DebateEvent::RoundCompleted {
                round,
                produced: outcome.produced.len(),
            },
        );
        Ok(outcome)
    }
}
