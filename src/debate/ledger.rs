// Feedback ledger
//
// Curated "agree" and "disagree" collections built from user ratings.
// Entries are deduplicated by (persona, argument) content; the rating itself
// lives on the source Statement. A shared entry stays listed while any
// statement with that content still carries the verdict.

use serde::{Deserialize, Serialize};

use super::statement::{Rating, Statement};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Agree,
    Disagree,
}

impl Verdict {
    pub fn rating(self) -> Rating {
        match self {
            Self::Agree => Rating::Agree,
            Self::Disagree => Rating::Disagree,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Self::Agree => Self::Disagree,
            Self::Disagree => Self::Agree,
        }
    }
}

/// Projection of a statement kept in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub icon: String,
    pub persona: String,
    pub argument: String,
    pub color: Option<String>,
}

impl LedgerEntry {
    pub fn from_statement(statement: &Statement) -> Self {
        Self {
            icon: statement.icon.clone(),
            persona: statement.persona.clone(),
            argument: statement.argument.clone(),
            color: statement.color.clone(),
        }
    }

    fn same_content(&self, statement: &Statement) -> bool {
        self.persona == statement.persona && self.argument == statement.argument
    }
}

/// One verdict's entries, with the number of statements holding each.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct Collection {
    entries: Vec<LedgerEntry>,
    holders: Vec<usize>,
}

impl Collection {
    fn position(&self, statement: &Statement) -> Option<usize> {
        self.entries.iter().position(|e| e.same_content(statement))
    }

    fn add(&mut self, statement: &Statement) {
        match self.position(statement) {
            Some(i) => self.holders[i] += 1,
            None => {
                self.entries.push(LedgerEntry::from_statement(statement));
                self.holders.push(1);
            }
        }
    }

    fn release(&mut self, statement: &Statement) {
        if let Some(i) = self.position(statement) {
            self.holders[i] = self.holders[i].saturating_sub(1);
            if self.holders[i] == 0 {
                self.entries.remove(i);
                self.holders.remove(i);
            }
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedbackLedger {
    agree: Collection,
    disagree: Collection,
}

impl FeedbackLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Toggle agreement. Returns the statement's new rating.
    pub fn mark_agree(&mut self, statement: &mut Statement) -> Rating {
        self.toggle(statement, Verdict::Agree)
    }

    /// Toggle disagreement. Returns the statement's new rating.
    pub fn mark_disagree(&mut self, statement: &mut Statement) -> Rating {
        self.toggle(statement, Verdict::Disagree)
    }

    fn toggle(&mut self, statement: &mut Statement, verdict: Verdict) -> Rating {
        if statement.rating == verdict.rating() {
            self.collection_mut(verdict).release(statement);
            statement.rating = Rating::Neutral;
        } else {
            if statement.rating == verdict.opposite().rating() {
                self.collection_mut(verdict.opposite()).release(statement);
            }
            self.collection_mut(verdict).add(statement);
            statement.rating = verdict.rating();
        }
        tracing::debug!(
            "{} rated {:?} ({} agree / {} disagree)",
            statement.persona,
            statement.rating,
            self.agree.entries.len(),
            self.disagree.entries.len()
        );
        statement.rating
    }

    /// Entries in first-seen order.
    pub fn list(&self, verdict: Verdict) -> &[LedgerEntry] {
        match verdict {
            Verdict::Agree => &self.agree.entries,
            Verdict::Disagree => &self.disagree.entries,
        }
    }

    pub fn contains(&self, verdict: Verdict, statement: &Statement) -> bool {
        self.list(verdict).iter().any(|e| e.same_content(statement))
    }

    pub fn is_empty(&self) -> bool {
        self.agree.entries.is_empty() && self.disagree.entries.is_empty()
    }

    fn collection_mut(&mut self, verdict: Verdict) -> &mut Collection {
        match verdict {
            Verdict::Agree => &mut self.agree,
            Verdict::Disagree => &mut self.disagree,
        }
    }

    /// Plain-text digest of both collections.
    pub fn summary(&self) -> String {
        let mut out = String::new();
        for (heading, entries) in [
            ("Agree", &self.agree.entries),
            ("Disagree", &self.disagree.entries),
        ] {
            out.push_str(heading);
            out.push_str(":\n");
            if entries.is_empty() {
                out.push_str("  (none)\n");
            }
            for entry in entries.iter() {
                out.push_str(&format!(
                    "  {} {}: {}\n",
                    entry.icon, entry.persona, entry.argument
                ));
            }
        }
        out
    }
}
