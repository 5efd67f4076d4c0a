use crate::domain::aggregates::Outcome;
use crate::domain::value_objects::SessionId;

/// Notifications pushed to whoever renders a session.
///
/// State itself travels through the snapshot channel; these are the one-off
/// signals a view shows once (toasts, closing the dialog).
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// The outcome reached the backend of record
    OutcomeReported {
        session_id: SessionId,
        outcome: Outcome,
        message: String,
    },
    /// The outcome could not be stored; the local result still stands
    OutcomeReportFailed {
        session_id: SessionId,
        outcome: Outcome,
        reason: String,
    },
    /// The session view should close
    Closed { session_id: SessionId },
}

impl SessionEvent {
    pub fn session_id(&self) -> &SessionId {
        match self {
            SessionEvent::OutcomeReported { session_id, .. }
            | SessionEvent::OutcomeReportFailed { session_id, .. }
            | SessionEvent::Closed { session_id } => session_id,
        }
    }
}
