use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::value_objects::{
    ContestId, ContestRules, Email, Evaluation, Participant, ParticipationStatus, ResultMessage,
    SessionId, Verdict,
};

/// Phase of a guessing session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Registration,
    Playing,
    /// Absorbing until the session is closed or restarted
    Terminal(Outcome),
}

/// How a session ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Won,
    LostAttemptsExhausted,
    LostTimeout,
    /// Registration was refused; the session never started
    AlreadyParticipated,
}

impl Outcome {
    pub fn has_won(&self) -> bool {
        matches!(self, Outcome::Won)
    }
}

/// Snapshot of a finished session, handed to the finalization reporter
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub contest_id: ContestId,
    pub participant: Participant,
    pub outcome: Outcome,
    pub attempt_count: u32,
    pub entered_numbers: Vec<i64>,
    pub elapsed_seconds: u32,
    pub completed_at: DateTime<Utc>,
}

impl SessionSummary {
    pub fn has_won(&self) -> bool {
        self.outcome.has_won()
    }
}

/// Side effects requested by a transition. The session never performs I/O
/// itself; the controller executes these in order.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    CheckParticipation { email: Email },
    StartTimer,
    StopTimer,
    Evaluate { attempt: u32, value: i64 },
    Finalize(SessionSummary),
}

/// Tunables that are not part of the contest itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttemptPolicy {
    /// When false, an attempt whose verification failed is given back
    pub consume_on_verification_error: bool,
}

impl Default for AttemptPolicy {
    fn default() -> Self {
        Self {
            consume_on_verification_error: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingGuess {
    attempt: u32,
    value: i64,
}

/// Guessing session aggregate root.
///
/// Owns every counter of one play-through and decides all phase transitions.
/// Each command returns the effects the caller has to run; commands that do
/// not apply to the current phase return nothing and leave the state alone.
#[derive(Debug, Clone)]
pub struct GameSession {
    id: SessionId,
    contest_id: ContestId,
    rules: ContestRules,
    policy: AttemptPolicy,
    phase: Phase,
    attempt_count: u32,
    entered_numbers: Vec<i64>,
    elapsed_seconds: u32,
    current_user: Option<Participant>,
    candidate: Option<Participant>,
    pending_guess: Option<PendingGuess>,
    message: Option<ResultMessage>,
    started_at: Option<DateTime<Utc>>,
    finalized: bool,
}

impl GameSession {
    /// Create a session waiting for registration
    pub fn new(contest_id: ContestId, rules: ContestRules) -> Self {
        Self::fresh(contest_id, rules, AttemptPolicy::default())
    }

    pub fn with_policy(mut self, policy: AttemptPolicy) -> Self {
        self.policy = policy;
        self
    }

    fn fresh(contest_id: ContestId, rules: ContestRules, policy: AttemptPolicy) -> Self {
        Self {
            id: SessionId::generate(),
            contest_id,
            rules,
            policy,
            phase: Phase::Registration,
            attempt_count: 0,
            entered_numbers: Vec::new(),
            elapsed_seconds: 0,
            current_user: None,
            candidate: None,
            pending_guess: None,
            message: None,
            started_at: None,
            finalized: false,
        }
    }

    /// Reset to a blank registration for the given contest
    pub fn start_registration(
        &mut self,
        contest_id: ContestId,
        rules: ContestRules,
    ) -> Vec<SessionEffect> {
        let was_playing = self.phase == Phase::Playing;
        *self = Self::fresh(contest_id, rules, self.policy);
        if was_playing {
            vec![SessionEffect::StopTimer]
        } else {
            Vec::new()
        }
    }

    pub fn submit_registration(&mut self, participant: Participant) -> Vec<SessionEffect> {
        if self.phase != Phase::Registration || self.candidate.is_some() {
            return Vec::new();
        }
        let email = participant.email.clone();
        self.candidate = Some(participant);
        self.message = None;
        vec![SessionEffect::CheckParticipation { email }]
    }

    pub fn participation_confirmed(&mut self, status: ParticipationStatus) -> Vec<SessionEffect> {
        if self.phase != Phase::Registration {
            return Vec::new();
        }
        let Some(candidate) = self.candidate.take() else {
            return Vec::new();
        };

        if status.already_participated {
            let text = non_empty_or(status.message, "You have already taken part in this contest.");
            self.message = Some(ResultMessage::error(text));
            self.phase = Phase::Terminal(Outcome::AlreadyParticipated);
            return Vec::new();
        }

        self.current_user = Some(candidate);
        self.phase = Phase::Playing;
        self.started_at = Some(Utc::now());
        self.message = Some(ResultMessage::info(format!(
            "Guess a number between {} and {}. You have {} attempts.",
            self.rules.min_value(),
            self.rules.max_value(),
            self.rules.max_attempts()
        )));
        vec![SessionEffect::StartTimer]
    }

    /// The check itself failed; the player may try again
    pub fn participation_check_failed(&mut self) -> Vec<SessionEffect> {
        if self.phase == Phase::Registration && self.candidate.take().is_some() {
            self.message = Some(ResultMessage::error(
                "Could not check your registration, please try again.",
            ));
        }
        Vec::new()
    }

    pub fn submit_guess(&mut self, value: Option<i64>) -> Vec<SessionEffect> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let Some(value) = value else {
            self.message = Some(ResultMessage::error("Please enter a number."));
            return Vec::new();
        };
        if !self.rules.contains(value) {
            self.message = Some(ResultMessage::error(format!(
                "The number must be between {} and {}.",
                self.rules.min_value(),
                self.rules.max_value()
            )));
            return Vec::new();
        }
        if self.pending_guess.is_some() {
            self.message = Some(ResultMessage::info(
                "Your previous guess is still being verified.",
            ));
            return Vec::new();
        }

        // Counted before any network round-trip
        self.attempt_count += 1;
        if self.attempt_count > self.rules.max_attempts() {
            self.message = Some(ResultMessage::error(format!(
                "You have used all {} attempts. Better luck next time!",
                self.rules.max_attempts()
            )));
            return self.finish(Outcome::LostAttemptsExhausted);
        }

        self.entered_numbers.push(value);
        let attempt = self.attempt_count;
        self.pending_guess = Some(PendingGuess { attempt, value });
        vec![SessionEffect::Evaluate { attempt, value }]
    }

    pub fn guess_evaluated(&mut self, attempt: u32, evaluation: Evaluation) -> Vec<SessionEffect> {
        let Some(pending) = self.take_pending(attempt) else {
            return Vec::new();
        };

        if evaluation.verdict == Verdict::Win {
            let text = non_empty_or(
                evaluation.message,
                &format!("Congratulations, {} is the winning number!", pending.value),
            );
            self.message = Some(ResultMessage::success(text));
            return self.finish(Outcome::Won);
        }

        let hint = match evaluation.verdict {
            Verdict::TooHigh => format!("{} is too high.", pending.value),
            Verdict::TooLow => format!("{} is too low.", pending.value),
            _ => format!("{} is not the winning number.", pending.value),
        };
        let mut text = non_empty_or(evaluation.message, &hint);
        let remaining = self.remaining_attempts();
        if remaining > 0 {
            text.push_str(&format!(" You have {} attempt(s) left.", remaining));
        }
        self.message = Some(ResultMessage::info(text));
        Vec::new()
    }

    pub fn evaluation_failed(&mut self, attempt: u32) -> Vec<SessionEffect> {
        if self.take_pending(attempt).is_none() {
            return Vec::new();
        }
        if !self.policy.consume_on_verification_error {
            self.attempt_count -= 1;
            self.entered_numbers.pop();
        }
        self.message = Some(ResultMessage::error(
            "Could not verify the number, please try again.",
        ));
        Vec::new()
    }

    /// One second of play elapsed
    pub fn tick(&mut self) -> Vec<SessionEffect> {
        if self.phase != Phase::Playing {
            return Vec::new();
        }
        let ceiling = self.rules.max_time_seconds();
        self.elapsed_seconds = (self.elapsed_seconds + 1).min(ceiling);
        if self.elapsed_seconds >= ceiling {
            self.message = Some(ResultMessage::error("Time is up! The game has ended."));
            return self.finish(Outcome::LostTimeout);
        }
        Vec::new()
    }

    /// Discard the play-through and go back to a blank registration
    pub fn close(&mut self) -> Vec<SessionEffect> {
        *self = Self::fresh(self.contest_id.clone(), self.rules, self.policy);
        vec![SessionEffect::StopTimer]
    }

    fn take_pending(&mut self, attempt: u32) -> Option<PendingGuess> {
        if self.phase != Phase::Playing {
            return None;
        }
        match self.pending_guess {
            Some(pending) if pending.attempt == attempt => self.pending_guess.take(),
            _ => None,
        }
    }

    fn finish(&mut self, outcome: Outcome) -> Vec<SessionEffect> {
        if matches!(self.phase, Phase::Terminal(_)) {
            return Vec::new();
        }
        let completed_at = Utc::now();
        self.phase = Phase::Terminal(outcome);
        self.pending_guess = None;

        let mut effects = vec![SessionEffect::StopTimer];
        if !self.finalized {
            if let Some(participant) = self.current_user.clone() {
                self.finalized = true;
                effects.push(SessionEffect::Finalize(SessionSummary {
                    session_id: self.id.clone(),
                    contest_id: self.contest_id.clone(),
                    participant,
                    outcome,
                    attempt_count: self.attempt_count,
                    entered_numbers: self.entered_numbers.clone(),
                    elapsed_seconds: self.elapsed_seconds,
                    completed_at,
                }));
            }
        }
        effects
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn contest_id(&self) -> &ContestId {
        &self.contest_id
    }

    pub fn rules(&self) -> &ContestRules {
        &self.rules
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempt_count
    }

    pub fn entered_numbers(&self) -> &[i64] {
        &self.entered_numbers
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn current_user(&self) -> Option<&Participant> {
        self.current_user.as_ref()
    }

    pub fn message(&self) -> Option<&ResultMessage> {
        self.message.as_ref()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn remaining_attempts(&self) -> u32 {
        self.rules.max_attempts().saturating_sub(self.attempt_count)
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.rules.max_time_seconds().saturating_sub(self.elapsed_seconds)
    }

    pub fn is_registering(&self) -> bool {
        self.candidate.is_some()
    }

    pub fn is_awaiting_verification(&self) -> bool {
        self.pending_guess.is_some()
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_))
    }
}

fn non_empty_or(text: String, fallback: &str) -> String {
    if text.trim().is_empty() {
        fallback.to_string()
    } else {
        text
    }
}
