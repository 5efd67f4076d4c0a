use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::GatewayError;
use crate::domain::aggregates::SessionSummary;

/// Persists the outcome of a finished session. Returns the backend's
/// acknowledgement text, which may be empty.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    async fn report(&self, summary: &SessionSummary) -> Result<String, GatewayError>;
}
