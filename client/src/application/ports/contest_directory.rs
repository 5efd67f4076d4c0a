use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use shared::ContestStatus;

use super::GatewayError;
use crate::domain::value_objects::ContestId;

/// Contest configuration as far as the guessing session cares
#[derive(Debug, Clone, PartialEq)]
pub struct ContestConfig {
    pub contest_id: ContestId,
    pub title: Option<String>,
    pub min_value: i64,
    pub max_value: i64,
    pub max_attempts: u32,
    pub status: ContestStatus,
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ContestDirectory: Send + Sync {
    async fn fetch_contest(&self, contest_id: &ContestId) -> Result<ContestConfig, GatewayError>;
}
