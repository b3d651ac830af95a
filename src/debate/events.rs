// Notifications for whatever presents the debate
//
// The session holds canonical state; events are read-only copies.

use tokio::sync::mpsc;

use super::statement::{Rating, Statement};
use crate::errors::ValidationWarning;

#[derive(Debug, Clone, PartialEq)]
pub enum DebateEvent {
    PersonasGenerated { count: usize },
    RoundStarted { round: usize, resumed: usize },
    StatementProduced {
        round: usize,
        index: usize,
        statement: Statement,
    },
    RoundCompleted { round: usize, produced: usize },
    RatingChanged {
        round: usize,
        index: usize,
        rating: Rating,
    },
    Warning(ValidationWarning),
}

pub type EventSender = mpsc::UnboundedSender<DebateEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<DebateEvent>;

pub fn channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Send if anyone is listening; a dropped receiver is not an error.
pub(crate) fn emit(sender: Option<&EventSender>, event: DebateEvent) {
    if let Some(tx) = sender {
        if tx.send(event).is_err() {
            tracing::trace!("Event receiver dropped");
        }
    }
}
