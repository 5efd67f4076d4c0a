use std::num::IntErrorKind;
use std::time::Duration;

use anyhow::Result;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, Lines};
use tokio::sync::broadcast;
use tracing::debug;

use crate::application::player::SessionHandle;
use crate::domain::aggregates::{GameSession, Outcome, Phase};
use crate::domain::events::{DomainEvent, SessionEvent};
use crate::domain::value_objects::{Participant, ResultMessage, Severity};

/// How long to wait for the finalization notice before leaving anyway
const REPORT_WAIT: Duration = Duration::from_secs(15);

/// Line-oriented front-end for one guessing session.
///
/// Reads the registration form and then one guess per line from `input`.
/// An empty line is an empty guess field; `quit` leaves the session.
pub async fn run<R, W>(handle: &SessionHandle, input: R, output: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut events = handle.subscribe_events();
    let mut state = handle.subscribe_state();

    let intro = handle.snapshot();
    write_line(
        output,
        &format!(
            "Contest {}: guess a number between {} and {} in at most {} attempts.",
            intro.contest_id(),
            intro.rules().min_value(),
            intro.rules().max_value(),
            intro.rules().max_attempts()
        ),
    )
    .await?;

    // Registration
    loop {
        let Some(participant) = read_participant(&mut lines, output).await? else {
            handle.close().await?;
            return Ok(());
        };
        handle.submit_registration(participant).await?;
        let session = state.wait_for(|s| !s.is_registering()).await?.clone();
        if let Some(message) = session.message() {
            write_line(output, &render_message(message)).await?;
        }
        match session.phase() {
            Phase::Playing => break,
            Phase::Terminal(_) => return finish(handle, &session, &mut events, output).await,
            Phase::Registration => continue,
        }
    }

    // Play
    let mut ended = handle.subscribe_state();
    loop {
        let current = handle.snapshot();
        write(
            output,
            &format!(
                "Your guess ({} attempts, {}s left): ",
                current.remaining_attempts(),
                current.remaining_seconds()
            ),
        )
        .await?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            finished = ended.wait_for(|s| s.is_terminal()) => {
                finished?;
                None
            }
        };

        let session = match line {
            None if handle.snapshot().is_terminal() => handle.snapshot(),
            None => {
                handle.close().await?;
                return Ok(());
            }
            Some(line) if line.trim().eq_ignore_ascii_case("quit") => {
                handle.close().await?;
                write_line(output, "Goodbye.").await?;
                return Ok(());
            }
            Some(line) => {
                let value = parse_guess(&line);
                debug!("Submitting guess {:?}", value);
                handle.submit_guess(value).await?;
                let settled = state
                    .wait_for(|s| s.is_terminal() || !s.is_awaiting_verification())
                    .await?;
                settled.clone()
            }
        };

        if session.is_terminal() {
            write_line(output, "").await?;
            return finish(handle, &session, &mut events, output).await;
        }
        if let Some(message) = session.message() {
            write_line(output, &render_message(message)).await?;
        }
    }
}

async fn finish<W: AsyncWrite + Unpin>(
    handle: &SessionHandle,
    session: &GameSession,
    events: &mut broadcast::Receiver<DomainEvent<SessionEvent>>,
    output: &mut W,
) -> Result<()> {
    if let Some(message) = session.message() {
        write_line(output, &render_message(message)).await?;
    }
    if let Phase::Terminal(outcome) = session.phase() {
        write_line(output, &render_summary(outcome, session)).await?;
    }

    if session.is_finalized() {
        let notice = tokio::time::timeout(REPORT_WAIT, async {
            while let Ok(event) = events.recv().await {
                if !event.concerns(session.id()) {
                    continue;
                }
                match event.data {
                    SessionEvent::OutcomeReported { message, .. } => {
                        return Some(ResultMessage::success(message));
                    }
                    SessionEvent::OutcomeReportFailed { reason, .. } => {
                        return Some(ResultMessage::error(reason));
                    }
                    SessionEvent::Closed { .. } => {}
                }
            }
            None
        })
        .await;
        if let Ok(Some(message)) = notice {
            write_line(output, &render_message(&message)).await?;
        }
    }

    handle.close().await?;
    Ok(())
}

async fn read_participant<R, W>(
    lines: &mut Lines<R>,
    output: &mut W,
) -> Result<Option<Participant>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    loop {
        let Some(name) = prompt(lines, output, "Name: ").await? else { return Ok(None) };
        let Some(surname) = prompt(lines, output, "Surname: ").await? else { return Ok(None) };
        let Some(email) = prompt(lines, output, "Email: ").await? else { return Ok(None) };
        let Some(phone) = prompt(lines, output, "Phone: ").await? else { return Ok(None) };

        match Participant::new(name, surname, email, phone) {
            Ok(participant) => return Ok(Some(participant)),
            Err(e) => write_line(output, &format!("[error] Invalid registration: {}", e)).await?,
        }
    }
}

async fn prompt<R, W>(lines: &mut Lines<R>, output: &mut W, label: &str) -> Result<Option<String>>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    write(output, label).await?;
    Ok(lines.next_line().await?)
}

/// Empty or non-numeric input is an empty field. Numbers too large for `i64`
/// saturate, so the session reports them as out of range.
fn parse_guess(text: &str) -> Option<i64> {
    match text.trim().parse::<i64>() {
        Ok(value) => Some(value),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}

pub fn render_message(message: &ResultMessage) -> String {
    let tag = match message.severity {
        Severity::Info => "[info]",
        Severity::Success => "[ok]",
        Severity::Error => "[error]",
    };
    format!("{} {}", tag, message.text)
}

pub fn render_summary(outcome: Outcome, session: &GameSession) -> String {
    let verdict = match outcome {
        Outcome::Won => "You won!",
        Outcome::LostAttemptsExhausted => "No attempts left.",
        Outcome::LostTimeout => "Out of time.",
        Outcome::AlreadyParticipated => "Registration refused.",
    };
    if outcome == Outcome::AlreadyParticipated {
        return verdict.to_string();
    }
    let numbers = session
        .entered_numbers()
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "{} Attempts: {}. Numbers tried: [{}]. Time: {}s.",
        verdict,
        session.attempt_count(),
        numbers,
        session.elapsed_seconds()
    )
}

async fn write<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    output.write_all(text.as_bytes()).await?;
    output.flush().await?;
    Ok(())
}

async fn write_line<W: AsyncWrite + Unpin>(output: &mut W, text: &str) -> Result<()> {
    write(output, &format!("{}\n", text)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::player::{ControllerConfig, SessionController, SessionPorts};
    use crate::application::ports::guess_evaluator::MockGuessEvaluator;
    use crate::application::ports::outcome_reporter::MockOutcomeReporter;
    use crate::application::ports::participation_registry::MockParticipationRegistry;
    use crate::domain::value_objects::{
        ContestId, ContestRules, Evaluation, ParticipationStatus, Verdict,
    };
    use std::sync::Arc;
    use tokio::io::BufReader;

    const WINNING: i64 = 60;

    fn spawn_session(already_participated: bool) -> SessionHandle {
        let mut registry = MockParticipationRegistry::new();
        registry.expect_check_participation().returning(move |_, _| {
            Ok(ParticipationStatus {
                already_participated,
                message: String::new(),
            })
        });

        let mut evaluator = MockGuessEvaluator::new();
        evaluator.expect_evaluate().returning(|_, value| {
            let verdict = match value.cmp(&WINNING) {
                std::cmp::Ordering::Equal => Verdict::Win,
                std::cmp::Ordering::Less => Verdict::TooLow,
                std::cmp::Ordering::Greater => Verdict::TooHigh,
            };
            Ok(Evaluation { verdict, message: String::new() })
        });

        let mut reporter = MockOutcomeReporter::new();
        reporter
            .expect_report()
            .returning(|_| Ok("Result saved".to_string()));

        SessionController::spawn(
            ContestId::new("spring").unwrap(),
            ContestRules::new(1, 100, 3).unwrap(),
            SessionPorts {
                registry: Arc::new(registry),
                evaluator: Arc::new(evaluator),
                reporter: Arc::new(reporter),
            },
            ControllerConfig::default(),
        )
    }

    async fn play(handle: &SessionHandle, script: &str) -> String {
        let mut output = Vec::new();
        run(handle, BufReader::new(script.as_bytes()), &mut output)
            .await
            .unwrap();
        String::from_utf8(output).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_game() {
        let handle = spawn_session(false);
        let output = play(
            &handle,
            "Ana\nRuiz\nana@example.com\n555\n\n500\n99999999999999999999\n50\n75\n60\n",
        )
        .await;

        assert!(output.contains("Contest spring: guess a number between 1 and 100"));
        assert!(output.contains("[error] Please enter a number."));
        assert_eq!(output.matches("[error] The number must be between 1 and 100.").count(), 2);
        assert!(output.contains("[info] 50 is too low. You have 2 attempt(s) left."));
        assert!(output.contains("[info] 75 is too high. You have 1 attempt(s) left."));
        assert!(output.contains("[ok] Congratulations, 60 is the winning number!"));
        assert!(output.contains("You won! Attempts: 3. Numbers tried: [50, 75, 60]."));
        assert!(output.contains("[ok] Result saved"));
        assert_eq!(handle.snapshot().phase(), Phase::Registration);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_registration_is_asked_again() {
        let handle = spawn_session(false);
        let output = play(
            &handle,
            "Ana\nRuiz\nnot-an-email\n555\nAna\nRuiz\nana@example.com\n555\nquit\n",
        )
        .await;

        assert!(output.contains("[error] Invalid registration: Invalid email format"));
        assert!(output.contains("Guess a number between 1 and 100"));
        assert!(output.contains("Goodbye."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refused_registration_ends_session() {
        let handle = spawn_session(true);
        let output = play(&handle, "Ana\nRuiz\nana@example.com\n555\n").await;

        assert!(output.contains("[error] You have already taken part in this contest."));
        assert!(output.contains("Registration refused."));
        assert!(!output.contains("Your guess"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_of_input_closes_session() {
        let handle = spawn_session(false);
        let output = play(&handle, "Ana\nRuiz\n").await;

        assert!(output.contains("Email: "));
        assert_eq!(handle.snapshot().phase(), Phase::Registration);
    }

    #[test]
    fn test_parse_guess() {
        assert_eq!(parse_guess(" 42 "), Some(42));
        assert_eq!(parse_guess("-7"), Some(-7));
        assert_eq!(parse_guess(""), None);
        assert_eq!(parse_guess("forty"), None);
        assert_eq!(parse_guess("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_guess("-99999999999999999999"), Some(i64::MIN));
    }

    #[test]
    fn test_render_message_tags() {
        assert_eq!(render_message(&ResultMessage::info("hi")), "[info] hi");
        assert_eq!(render_message(&ResultMessage::success("yay")), "[ok] yay");
        assert_eq!(render_message(&ResultMessage::error("no")), "[error] no");
    }
}
