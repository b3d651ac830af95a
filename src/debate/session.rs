// Debate session state
//
// One session owns the personas, round history and ledger for a single
// topic. `SessionHandle` wraps it for callers that may fire concurrently
// (rapid UI actions): every operation takes the same async lock, so round
// invocations never interleave.

use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use super::compactor::{ExtractiveSummarizer, HistoryCompactor, Summarizer};
use super::engine::{RoundEngine, RoundOutcome, StatementPostProcessor};
use super::events::{emit, DebateEvent, EventSender};
use super::ledger::FeedbackLedger;
use super::persona::{add_one_persona, generate_personas, Persona, PersonaId, PersonaStore};
use super::statement::{Rating, RoundHistory};
use crate::config::DebateConfig;
use crate::errors::DebateResult;
use crate::generators::Generator;

pub struct DebateSession {
    topic: String,
    config: DebateConfig,
    personas: PersonaStore,
    history: RoundHistory,
    ledger: FeedbackLedger,
    engine: RoundEngine,
    events: Option<EventSender>,
}

impl DebateSession {
    /// Session using the bundled extractive summarizer for compaction.
    pub fn new(topic: impl Into<String>, config: DebateConfig, generator: Arc<dyn Generator>) -> Self {
        Self::with_summarizer(topic, config, generator, Arc::new(ExtractiveSummarizer::new()))
    }

    pub fn with_summarizer(
        topic: impl Into<String>,
        config: DebateConfig,
        generator: Arc<dyn Generator>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            topic: topic.into(),
            config,
            personas: PersonaStore::new(),
            history: RoundHistory::new(),
            ledger: FeedbackLedger::new(),
            engine: RoundEngine::new(generator, HistoryCompactor::new(summarizer)),
            events: None,
        }
    }

    pub fn with_post_processor(mut self, processor: Arc<dyn StatementPostProcessor>) -> Self {
        self.engine = self.engine.with_post_processor(processor);
        self
    }

    pub fn with_events(mut self, events: EventSender) -> Self {
        self.engine = self.engine.with_events(events.clone());
        self.events = Some(events);
        self
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn config(&self) -> &DebateConfig {
        &self.config
    }

    pub fn personas(&self) -> &PersonaStore {
        &self.personas
    }

    /// Direct access for edits, removal, reordering and participation.
    pub fn personas_mut(&mut self) -> &mut PersonaStore {
        &mut self.personas
    }

    pub fn history(&self) -> &RoundHistory {
        &self.history
    }

    pub fn ledger(&self) -> &FeedbackLedger {
        &self.ledger
    }

    /// Replace the persona set with `num_personas` freshly generated ones.
    pub async fn generate_personas(&mut self) -> DebateResult<usize> {
        let count = self.config.debate_params.num_personas;
        let personas = generate_personas(
            self.engine.generator().as_ref(),
            &self.topic,
            count,
            &self.config,
        )
        .await?;

        let generated = personas.len();
        self.personas.replace_all(personas);
        tracing::info!("Generated {} personas for '{}'", generated, self.topic);
        emit(
            self.events.as_ref(),
            DebateEvent::PersonasGenerated { count: generated },
        );
        Ok(generated)
    }

    /// Generate one more persona and append it. Existing personas are not
    /// touched.
    pub async fn add_persona(&mut self) -> DebateResult<PersonaId> {
        let existing: Vec<Persona> = self.personas.iter().cloned().collect();
        let persona = add_one_persona(
            self.engine.generator().as_ref(),
            &self.topic,
            &existing,
            &self.config,
        )
        .await?;
        tracing::info!("Added persona '{}'", persona.title);
        Ok(self.personas.push(persona))
    }

    /// Run the next round (or finish the in-progress one).
    pub async fn run_round(&mut self) -> DebateResult<RoundOutcome> {
        let participants: Vec<Persona> = self.personas.participants().into_iter().cloned().collect();
        self.engine
            .run_round(&self.topic, &participants, &self.config, &mut self.history)
            .await
    }

    /// Re-run a specific round, generating only missing turns.
    pub async fn run_round_at(&mut self, round: usize) -> DebateResult<RoundOutcome> {
        let participants: Vec<Persona> = self.personas.participants().into_iter().cloned().collect();
        self.engine
            .run_round_at(round, &self.topic, &participants, &self.config, &mut self.history)
            .await
    }

    /// Run rounds until `num_debate_rounds` rounds are complete.
    pub async fn run_debate(&mut self) -> DebateResult<Vec<RoundOutcome>> {
        let target = self.config.debate_params.num_debate_rounds as usize;
        let mut outcomes = Vec::new();
        while self.completed_rounds() < target {
            outcomes.push(self.run_round().await?);
        }
        Ok(outcomes)
    }

    /// Rounds started so far, not counting a last round that is still
    /// missing a current participant. Earlier rounds are never revisited, so
    /// personas added after they closed do not reopen them.
    pub fn completed_rounds(&self) -> usize {
        let participants: Vec<Persona> = self.personas.participants().into_iter().cloned().collect();
        match self.history.last_round() {
            Some((last, _)) if !self.history.is_round_complete(last, &participants) => last,
            _ => self.history.len(),
        }
    }

    pub fn mark_agree(&mut self, round: usize, index: usize) -> DebateResult<Rating> {
        let statement = self.history.statement_mut(round, index)?;
        let rating = self.ledger.mark_agree(statement);
        self.rating_changed(round, index, rating);
        Ok(rating)
    }

    pub fn mark_disagree(&mut self, round: usize, index: usize) -> DebateResult<Rating> {
        let statement = self.history.statement_mut(round, index)?;
        let rating = self.ledger.mark_disagree(statement);
        self.rating_changed(round, index, rating);
        Ok(rating)
    }

    fn rating_changed(&self, round: usize, index: usize, rating: Rating) {
        emit(
            self.events.as_ref(),
            DebateEvent::RatingChanged {
                round,
                index,
                rating,
            },
        );
    }
}

/// Shared, serialised access to a session.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Mutex<DebateSession>>,
}

impl SessionHandle {
    pub fn new(session: DebateSession) -> Self {
        Self {
            inner: Arc::new(Mutex::new(session)),
        }
    }

    /// Exclusive access for reads and persona edits.
    pub async fn lock(&self) -> MutexGuard<'_, DebateSession> {
        self.inner.lock().await
    }

    pub async fn generate_personas(&self) -> DebateResult<usize> {
        self.inner.lock().await.generate_personas().await
    }

    pub async fn run_round(&self) -> DebateResult<RoundOutcome> {
        self.inner.lock().await.run_round().await
    }

    pub async fn run_round_at(&self, round: usize) -> DebateResult<RoundOutcome> {
        self.inner.lock().await.run_round_at(round).await
    }

    pub async fn mark_agree(&self, round: usize, index: usize) -> DebateResult<Rating> {
        self.inner.lock().await.mark_agree(round, index)
    }

    pub async fn mark_disagree(&self, round: usize, index: usize) -> DebateResult<Rating> {
        self.inner.lock().await.mark_disagree(round, index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::DebateError;
    use crate::generators::GenerationRequest;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Persona JSON for generation prompts, numbered text otherwise
    struct FakeModel {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Generator for FakeModel {
        async fn generate(&self, request: &GenerationRequest) -> DebateResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if request.prompt.contains("Output the personas") {
                return Ok(r#"[{"title": "Miner", "description": "digs", "emoji": "⛏️"},
                              {"title": "Scientist", "description": "measures", "emoji": "🔬"}]"#
                    .to_string());
            }
            if request.prompt.contains("one additional persona") {
                return Ok(r#"{"title": "Economist", "description": "prices", "emoji": "💰"}"#
                    .to_string());
            }
            Ok(format!("turn {n}"))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn session() -> (DebateSession, Arc<FakeModel>) {
        let model = Arc::new(FakeModel {
            calls: AtomicUsize::new(0),
        });
        let session = DebateSession::new("Coal vs renewables", DebateConfig::default(), model.clone());
        (session, model)
    }

    #[tokio::test]
    async fn test_generate_then_add_persona() {
        let (mut session, _) = session();
        assert_eq!(session.generate_personas().await.unwrap(), 2);
        let before: Vec<Persona> = session.personas().iter().cloned().collect();

        let id = session.add_persona().await.unwrap();
        assert_eq!(session.personas().len(), 3);
        assert_eq!(session.personas().get(id).unwrap().title, "Economist");
        let after: Vec<Persona> = session.personas().iter().take(2).cloned().collect();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_run_debate_completes_configured_rounds() {
        let (mut session, model) = session();
        session.generate_personas().await.unwrap();
        let outcomes = session.run_debate().await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert_eq!(session.completed_rounds(), 2);
        // 1 persona call + 2 rounds x 2 personas
        assert_eq!(model.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_run_debate_stops_after_persona_joins_late() {
        let model = Arc::new(FakeModel {
            calls: AtomicUsize::new(0),
        });
        let mut config = DebateConfig::default();
        config.debate_params.num_debate_rounds = 3;
        let mut session = DebateSession::new("Coal vs renewables", config, model.clone());
        session.generate_personas().await.unwrap();
        session.run_round().await.unwrap();
        session.run_round().await.unwrap();

        session.personas_mut().push(Persona::new("Economist", "prices"));
        assert_eq!(session.completed_rounds(), 1);

        let outcomes = session.run_debate().await.unwrap();
        // Round 1 is finished for the newcomer, then round 2 runs in full
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].round, 1);
        assert_eq!(outcomes[0].produced, vec!["Economist"]);
        assert_eq!(outcomes[1].round, 2);
        assert_eq!(session.history().len(), 3);
        assert_eq!(session.completed_rounds(), 3);
        // 1 persona call + 2 x 2 turns + 1 catch-up turn + 3 turns
        assert_eq!(model.calls.load(Ordering::SeqCst), 9);
        assert_eq!(session.history().round(0).unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_mark_agree_updates_statement_and_ledger() {
        let (mut session, _) = session();
        session.generate_personas().await.unwrap();
        session.run_round().await.unwrap();

        assert_eq!(session.mark_agree(0, 1).unwrap(), Rating::Agree);
        assert_eq!(session.history().statement(0, 1).unwrap().rating, Rating::Agree);
        assert_eq!(session.mark_agree(0, 1).unwrap(), Rating::Neutral);
        assert!(session.ledger().is_empty());
    }

    #[tokio::test]
    async fn test_mark_unknown_statement() {
        let (mut session, _) = session();
        assert!(matches!(
            session.mark_disagree(4, 0),
            Err(DebateError::UnknownStatement { round: 4, index: 0 })
        ));
    }

    #[tokio::test]
    async fn test_handle_serialises_concurrent_rounds() {
        let (mut session, model) = session();
        session.generate_personas().await.unwrap();
        let handle = SessionHandle::new(session);

        let (a, b) = tokio::join!(handle.run_round(), handle.run_round());
        let (a, b) = (a.unwrap(), b.unwrap());

        // Two distinct rounds, never a duplicated turn
        assert_ne!(a.round, b.round);
        let guard = handle.lock().await;
        assert_eq!(guard.history().len(), 2);
        assert_eq!(guard.history().total_statements(), 4);
        assert_eq!(model.calls.load(Ordering::SeqCst), 5);
    }
}
