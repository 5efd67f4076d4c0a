use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Contest configuration served by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ContestConfigResponse {
    pub id: String,
    pub min_value: i64,
    pub max_value: i64,
    pub max_attempts: u32,
    pub status: ContestStatus,
    #[serde(default)]
    pub title: Option<String>,
}

/// Lifecycle status of a contest. Only `OPEN` contests accept players.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContestStatus {
    Draft,
    Open,
    Closed,
    Finished,
    #[serde(other)]
    Unknown,
}

/// Answer to "has this email already played this contest?"
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipationCheckResponse {
    pub already_participated: bool,
    #[serde(default)]
    pub message: String,
}

/// Body of a guess verification request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuessRequest {
    pub guessed_value: i64,
}

/// Backend verdict for one guess.
///
/// `status` is `"WIN"` for the winning number. Anything else is a hint,
/// usually `"TOO_HIGH"` or `"TOO_LOW"`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuessResponse {
    pub status: String,
    #[serde(default)]
    pub message: String,
}

/// The only `GuessResponse::status` that means the number was found
pub const WIN_STATUS: &str = "WIN";

/// Participant identity as the backend stores it
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantPayload {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
}

/// Final progress of a guessing session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GuessProgressPayload {
    pub attempt_count: u32,
    /// Comma separated, in the order they were entered
    pub numbers_tried: String,
    pub has_won: bool,
    /// RFC 3339 timestamp of the moment the session ended
    pub last_attempt_time: String,
    pub duration_seconds: u32,
}

/// Body of the one-time session outcome registration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegisterOutcomeRequest {
    pub user: ParticipantPayload,
    pub guess_progress: GuessProgressPayload,
}

/// Generic acknowledgement; the backend may send an empty body
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Acknowledgement {
    #[serde(default)]
    pub message: Option<String>,
}

/// Error body returned by the backend on non-2xx responses
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    #[serde(alias = "error")]
    pub message: String,
}

pub fn join_numbers(numbers: &[i64]) -> String {
    numbers
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn split_numbers(raw: &str) -> anyhow::Result<Vec<i64>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid number in list: {:?}", part))
        })
        .collect()
}
