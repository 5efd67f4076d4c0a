use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use super::GatewayError;
use crate::domain::value_objects::{ContestId, Email, ParticipationStatus};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParticipationRegistry: Send + Sync {
    async fn check_participation(
        &self,
        contest_id: &ContestId,
        email: &Email,
    ) -> Result<ParticipationStatus, GatewayError>;
}
