use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::GatewayError;
use crate::domain::value_objects::{ContestId, Evaluation};

/// Asks the backend whether a number wins. One request, no retries, no
/// session state.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GuessEvaluator: Send + Sync {
    async fn evaluate(&self, contest_id: &ContestId, value: i64)
        -> Result<Evaluation, GatewayError>;
}
