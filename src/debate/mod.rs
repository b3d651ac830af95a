// Debate orchestration core
//
// personas -> prompt templates -> (compacted) history -> generator -> rounds
// -> ledger

pub mod compactor;
pub mod engine;
pub mod events;
pub mod ledger;
pub mod persona;
pub mod session;
pub mod statement;
pub mod template;

pub use compactor::{ExtractiveSummarizer, HistoryCompactor, Summarizer};
pub use engine::{RoundEngine, RoundOutcome, StatementPostProcessor};
pub use events::{DebateEvent, EventReceiver, EventSender};
pub use ledger::{FeedbackLedger, LedgerEntry, Verdict};
pub use persona::{Persona, PersonaId, PersonaStore};
pub use session::{DebateSession, SessionHandle};
pub use statement::{Rating, RoundHistory, Statement};
pub use template::{PromptTemplate, Substitutions};
