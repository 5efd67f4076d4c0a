use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::SessionEvent;
use crate::domain::value_objects::SessionId;

/// Envelope for anything a session broadcasts to its observers
#[derive(Debug, Clone)]
pub struct DomainEvent<T> {
    pub event_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub data: T,
}

impl<T> DomainEvent<T> {
    pub fn new(data: T) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            occurred_at: Utc::now(),
            data,
        }
    }
}

impl DomainEvent<SessionEvent> {
    /// Observers may outlive a play-through; this filters out events of
    /// earlier sessions.
    pub fn concerns(&self, session_id: &SessionId) -> bool {
        self.data.session_id() == session_id
    }
}
