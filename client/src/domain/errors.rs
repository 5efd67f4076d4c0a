use thiserror::Error;

/// Validation failures raised while building domain values
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("Email is required")]
    MissingEmail,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Email too long")]
    EmailTooLong,
    #[error("Name cannot be empty")]
    EmptyName,
    #[error("Name too long")]
    NameTooLong,
    #[error("Contest id cannot be empty")]
    EmptyContestId,
    #[error("Minimum value {min} must be lower than maximum value {max}")]
    InvalidRange { min: i64, max: i64 },
    #[error("A contest needs at least one attempt")]
    NoAttempts,
    #[error("Time limit must be at least one second")]
    NoTime,
}
