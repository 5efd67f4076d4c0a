use serde::{Deserialize, Serialize};

/// Categorical answer to one guess
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    TooHigh,
    TooLow,
    /// Not the winning number, but the backend gave no direction
    Miss,
    Win,
}

impl Verdict {
    /// Only the exact `WIN` status wins; hint statuses are case-insensitive
    pub fn from_status(status: &str) -> Self {
        if status == shared::WIN_STATUS {
            return Verdict::Win;
        }
        match status.trim().to_ascii_uppercase().as_str() {
            "TOO_HIGH" | "HIGH" | "HIGHER" => Verdict::TooHigh,
            "TOO_LOW" | "LOW" | "LOWER" => Verdict::TooLow,
            _ => Verdict::Miss,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Backend wording, shown to the player when present
    pub message: String,
}

/// Result of the duplicate-participation check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipationStatus {
    pub already_participated: bool,
    pub message: String,
}
