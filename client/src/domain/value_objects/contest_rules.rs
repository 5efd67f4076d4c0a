use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Wall-clock ceiling for one session, independent of the attempt budget
pub const DEFAULT_MAX_TIME_SECONDS: u32 = 3600;

/// Numeric rules of a guessing contest, fixed for the whole session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContestRules {
    min_value: i64,
    max_value: i64,
    max_attempts: u32,
    max_time_seconds: u32,
}

impl ContestRules {
    pub fn new(min_value: i64, max_value: i64, max_attempts: u32) -> Result<Self, DomainError> {
        Self::with_time_limit(min_value, max_value, max_attempts, DEFAULT_MAX_TIME_SECONDS)
    }

    pub fn with_time_limit(
        min_value: i64,
        max_value: i64,
        max_attempts: u32,
        max_time_seconds: u32,
    ) -> Result<Self, DomainError> {
        if min_value >= max_value {
            return Err(DomainError::InvalidRange { min: min_value, max: max_value });
        }
        if max_attempts == 0 {
            return Err(DomainError::NoAttempts);
        }
        if max_time_seconds == 0 {
            return Err(DomainError::NoTime);
        }
        Ok(Self {
            min_value,
            max_value,
            max_attempts,
            max_time_seconds,
        })
    }

    pub fn min_value(&self) -> i64 {
        self.min_value
    }

    pub fn max_value(&self) -> i64 {
        self.max_value
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn max_time_seconds(&self) -> u32 {
        self.max_time_seconds
    }

    /// Inclusive on both ends
    pub fn contains(&self, value: i64) -> bool {
        (self.min_value..=self.max_value).contains(&value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rules_validation() {
        assert!(ContestRules::new(1, 100, 3).is_ok());
        assert_eq!(
            ContestRules::new(10, 10, 3),
            Err(DomainError::InvalidRange { min: 10, max: 10 })
        );
        assert_eq!(ContestRules::new(1, 100, 0), Err(DomainError::NoAttempts));
        assert_eq!(ContestRules::with_time_limit(1, 100, 3, 0), Err(DomainError::NoTime));
    }

    #[test]
    fn test_range_is_inclusive() {
        let rules = ContestRules::new(-5, 5, 1).unwrap();
        assert!(rules.contains(-5));
        assert!(rules.contains(5));
        assert!(!rules.contains(6));
        assert!(!rules.contains(-6));
        assert_eq!(rules.max_time_seconds(), DEFAULT_MAX_TIME_SECONDS);
    }
}
