use shared::ContestStatus;
use thiserror::Error;
use tracing::info;

use crate::application::ports::{ContestDirectory, GatewayError};
use crate::domain::errors::DomainError;
use crate::domain::value_objects::{ContestId, ContestRules};

#[derive(Debug, Error)]
pub enum EnterContestError {
    #[error("Contest {contest_id} is not open (status: {status:?})")]
    NotOpen { contest_id: ContestId, status: ContestStatus },
    #[error("Contest rules are invalid: {0}")]
    InvalidRules(#[from] DomainError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
}

pub struct EnteredContest {
    pub contest_id: ContestId,
    pub title: Option<String>,
    pub rules: ContestRules,
}

/// Fetch a contest's configuration and turn it into session rules.
/// Only `OPEN` contests can be played.
pub async fn execute<D: ContestDirectory + ?Sized>(
    directory: &D,
    contest_id: &ContestId,
    max_time_seconds: u32,
) -> Result<EnteredContest, EnterContestError> {
    let config = directory.fetch_contest(contest_id).await?;

    if config.status != ContestStatus::Open {
        return Err(EnterContestError::NotOpen {
            contest_id: contest_id.clone(),
            status: config.status,
        });
    }

    let rules = ContestRules::with_time_limit(
        config.min_value,
        config.max_value,
        config.max_attempts,
        max_time_seconds,
    )?;

    info!(
        "Entered contest {} ({}..={}, {} attempts)",
        contest_id,
        rules.min_value(),
        rules.max_value(),
        rules.max_attempts()
    );

    Ok(EnteredContest {
        contest_id: config.contest_id,
        title: config.title,
        rules,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::contest_directory::MockContestDirectory;
    use crate::application::ports::ContestConfig;

    fn config(status: ContestStatus, min: i64, max: i64, attempts: u32) -> ContestConfig {
        ContestConfig {
            contest_id: ContestId::new("contest-1").unwrap(),
            title: Some("Summer guess".to_string()),
            min_value: min,
            max_value: max,
            max_attempts: attempts,
            status,
        }
    }

    fn directory_returning(result: Result<ContestConfig, GatewayError>) -> MockContestDirectory {
        let mut directory = MockContestDirectory::new();
        directory
            .expect_fetch_contest()
            .times(1)
            .returning(move |_| result.clone());
        directory
    }

    #[tokio::test]
    async fn test_open_contest_yields_rules() {
        let directory = directory_returning(Ok(config(ContestStatus::Open, 1, 100, 3)));
        let contest_id = ContestId::new("contest-1").unwrap();

        let entered = execute(&directory, &contest_id, 600).await.unwrap();

        assert_eq!(entered.rules.min_value(), 1);
        assert_eq!(entered.rules.max_value(), 100);
        assert_eq!(entered.rules.max_attempts(), 3);
        assert_eq!(entered.rules.max_time_seconds(), 600);
        assert_eq!(entered.title.as_deref(), Some("Summer guess"));
    }

    #[tokio::test]
    async fn test_closed_contest_is_refused() {
        let directory = directory_returning(Ok(config(ContestStatus::Closed, 1, 100, 3)));
        let contest_id = ContestId::new("contest-1").unwrap();

        let err = execute(&directory, &contest_id, 3600).await.err().unwrap();
        assert!(matches!(err, EnterContestError::NotOpen { status: ContestStatus::Closed, .. }));
    }

    #[tokio::test]
    async fn test_invalid_rules_are_refused() {
        let directory = directory_returning(Ok(config(ContestStatus::Open, 50, 10, 3)));
        let contest_id = ContestId::new("contest-1").unwrap();

        let err = execute(&directory, &contest_id, 3600).await.err().unwrap();
        assert!(matches!(
            err,
            EnterContestError::InvalidRules(DomainError::InvalidRange { min: 50, max: 10 })
        ));
    }

    #[tokio::test]
    async fn test_gateway_errors_propagate() {
        let directory = directory_returning(Err(GatewayError::Transport("timeout".into())));
        let contest_id = ContestId::new("contest-1").unwrap();

        let err = execute(&directory, &contest_id, 3600).await.err().unwrap();
        assert!(matches!(err, EnterContestError::Gateway(GatewayError::Transport(_))));
    }
}
