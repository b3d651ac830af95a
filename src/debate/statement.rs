// Statements and round history

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::persona::{Persona, PersonaId};
use crate::errors::{DebateError, DebateResult};

/// User rating of a single statement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    #[default]
    Neutral,
    Agree,
    Disagree,
}

/// One persona's argument in one round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statement {
    pub persona_id: PersonaId,
    pub icon: String,
    /// Persona title at the time the statement was produced
    pub persona: String,
    pub argument: String,
    pub color: Option<String>,
    pub rating: Rating,
    pub produced_at: DateTime<Utc>,
}

impl Statement {
    pub fn new(persona: &Persona, argument: impl Into<String>) -> Self {
        Self {
            persona_id: persona.id,
            icon: persona.display_icon().to_string(),
            persona: persona.title.clone(),
            argument: argument.into(),
            color: persona.color.clone(),
            rating: Rating::Neutral,
            produced_at: Utc::now(),
        }
    }

    /// Copy with a different argument text; every other field is kept.
    pub fn with_argument(&self, argument: impl Into<String>) -> Self {
        Self {
            argument: argument.into(),
            ..self.clone()
        }
    }

    pub fn transcript_line(&self) -> String {
        format!("{}: {}", self.persona, self.argument)
    }

    /// Case-insensitive title match used for resume detection.
    pub fn is_from(&self, title: &str) -> bool {
        self.persona.to_lowercase() == title.to_lowercase()
    }
}

/// Serialised transcript: one `persona: argument` line per statement,
/// separated by blank lines.
pub fn render_transcript(statements: &[Statement]) -> String {
    statements
        .iter()
        .map(Statement::transcript_line)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Word count of the serialised transcript.
pub fn word_count(statements: &[Statement]) -> usize {
    render_transcript(statements).split_whitespace().count()
}

/// Statements per round, in speaking order. Round indices are 0-based and
/// contiguous; the last round may be partially filled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundHistory {
    rounds: Vec<Vec<Statement>>,
}

impl RoundHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of rounds started so far (complete or not).
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    pub fn round(&self, index: usize) -> Option<&[Statement]> {
        self.rounds.get(index).map(Vec::as_slice)
    }

    pub fn last_round(&self) -> Option<(usize, &[Statement])> {
        let index = self.rounds.len().checked_sub(1)?;
        Some((index, self.rounds[index].as_slice()))
    }

    /// Open round `index`. Only the next round index may be opened.
    pub fn start_round(&mut self, index: usize) -> DebateResult<()> {
        if index != self.rounds.len() {
            return Err(DebateError::RoundOutOfOrder {
                requested: index,
                next: self.rounds.len(),
            });
        }
        self.rounds.push(Vec::new());
        Ok(())
    }

    /// Append to an open round; returns the statement's position.
    pub fn push(&mut self, round: usize, statement: Statement) -> DebateResult<usize> {
        let next = self.rounds.len();
        let statements = self.rounds.get_mut(round).ok_or(DebateError::RoundOutOfOrder {
            requested: round,
            next,
        })?;
        statements.push(statement);
        Ok(statements.len() - 1)
    }

    /// Position of `title`'s statement in `round`, if it has spoken.
    pub fn find_by_title(&self, round: usize, title: &str) -> Option<usize> {
        self.rounds.get(round)?.iter().position(|s| s.is_from(title))
    }

    pub fn statement(&self, round: usize, index: usize) -> Option<&Statement> {
        self.rounds.get(round)?.get(index)
    }

    pub fn statement_mut(&mut self, round: usize, index: usize) -> DebateResult<&mut Statement> {
        self.rounds
            .get_mut(round)
            .and_then(|r| r.get_mut(index))
            .ok_or(DebateError::UnknownStatement { round, index })
    }

    /// True when every participant has a statement in `round`.
    pub fn is_round_complete(&self, round: usize, participants: &[Persona]) -> bool {
        participants
            .iter()
            .all(|p| self.find_by_title(round, &p.title).is_some())
    }

    /// All statements of rounds `0..=round`, in order.
    pub fn statements_through(&self, round: usize) -> Vec<Statement> {
        self.rounds
            .iter()
            .take(round + 1)
            .flat_map(|r| r.iter().cloned())
            .collect()
    }

    pub fn total_statements(&self) -> usize {
        self.rounds.iter().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn persona(title: &str) -> Persona {
        Persona::new(title, format!("{title} desc"))
    }

    #[test]
    fn test_statement_icon_falls_back_to_title() {
        let s = Statement::new(&persona("Farmer"), "Crops need rain.");
        assert_eq!(s.icon, "Farmer");
        let s = Statement::new(&persona("Farmer").with_icon("🌾"), "Crops need rain.");
        assert_eq!(s.icon, "🌾");
        assert_eq!(s.rating, Rating::Neutral);
    }

    #[test]
    fn test_render_transcript_format() {
        let a = Statement::new(&persona("A"), "one two");
        let b = Statement::new(&persona("B"), "three");
        assert_eq!(render_transcript(&[a.clone(), b.clone()]), "A: one two\n\nB: three");
        assert_eq!(word_count(&[a, b]), 5);
    }

    #[test]
    fn test_with_argument_keeps_other_fields() {
        let mut s = Statement::new(&persona("A").with_color("#fff"), "long text");
        s.rating = Rating::Agree;
        let short = s.with_argument("short");
        assert_eq!(short.argument, "short");
        assert_eq!(short.color.as_deref(), Some("#fff"));
        assert_eq!(short.rating, Rating::Agree);
        assert_eq!(short.persona_id, s.persona_id);
        assert_eq!(short.produced_at, s.produced_at);
    }

    #[test]
    fn test_rounds_open_in_sequence() {
        let mut history = RoundHistory::new();
        assert!(matches!(
            history.start_round(1),
            Err(DebateError::RoundOutOfOrder { requested: 1, next: 0 })
        ));
        history.start_round(0).unwrap();
        history.start_round(1).unwrap();
        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_find_by_title_is_case_insensitive() {
        let mut history = RoundHistory::new();
        history.start_round(0).unwrap();
        history.push(0, Statement::new(&persona("Coal Miner"), "x")).unwrap();
        assert_eq!(history.find_by_title(0, "coal miner"), Some(0));
        assert_eq!(history.find_by_title(0, "Scientist"), None);
        assert_eq!(history.find_by_title(3, "Coal Miner"), None);
    }

    #[test]
    fn test_round_completion() {
        let a = persona("A");
        let b = persona("B");
        let mut history = RoundHistory::new();
        history.start_round(0).unwrap();
        history.push(0, Statement::new(&a, "x")).unwrap();
        assert!(!history.is_round_complete(0, &[a.clone(), b.clone()]));
        history.push(0, Statement::new(&b, "y")).unwrap();
        assert!(history.is_round_complete(0, &[a, b]));
    }

    #[test]
    fn test_statement_mut_unknown_position() {
        let mut history = RoundHistory::new();
        assert!(matches!(
            history.statement_mut(0, 0),
            Err(DebateError::UnknownStatement { round: 0, index: 0 })
        ));
    }

    #[test]
    fn test_statements_through_spans_rounds() {
        let a = persona("A");
        let mut history = RoundHistory::new();
        history.start_round(0).unwrap();
        history.push(0, Statement::new(&a, "r0")).unwrap();
        history.start_round(1).unwrap();
        history.push(1, Statement::new(&a, "r1")).unwrap();
        let all = history.statements_through(1);
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].argument, "r1");
        assert_eq!(history.statements_through(0).len(), 1);
        assert_eq!(history.total_statements(), 2);
    }
}
