use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::timer::SessionTimer;
use crate::application::ports::{
    GatewayError, GuessEvaluator, OutcomeReporter, ParticipationRegistry,
};
use crate::domain::aggregates::{AttemptPolicy, GameSession, Outcome, SessionEffect, SessionSummary};
use crate::domain::events::{DomainEvent, SessionEvent};
use crate::domain::value_objects::{
    ContestId, ContestRules, Evaluation, Participant, ParticipationStatus, SessionId,
};

/// Backend collaborators a session needs while it runs
#[derive(Clone)]
pub struct SessionPorts {
    pub registry: Arc<dyn ParticipationRegistry>,
    pub evaluator: Arc<dyn GuessEvaluator>,
    pub reporter: Arc<dyn OutcomeReporter>,
}

#[derive(Debug, Clone, Copy)]
pub struct ControllerConfig {
    pub tick_period: Duration,
    pub policy: AttemptPolicy,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            tick_period: Duration::from_secs(1),
            policy: AttemptPolicy::default(),
        }
    }
}

#[derive(Debug, Error)]
#[error("Session controller has stopped")]
pub struct ControllerStopped;

/// Commands accepted from the view. Each one is answered with the session
/// snapshot taken right after it was applied.
#[derive(Debug)]
enum SessionCommand {
    StartRegistration { contest_id: ContestId, rules: ContestRules },
    SubmitRegistration(Participant),
    SubmitGuess(Option<i64>),
    Close,
}

/// Messages posted back by the timer and by collaborator calls
#[derive(Debug)]
enum Internal {
    Tick {
        generation: u64,
    },
    ParticipationChecked {
        generation: u64,
        result: Result<ParticipationStatus, GatewayError>,
    },
    GuessEvaluated {
        generation: u64,
        attempt: u32,
        result: Result<Evaluation, GatewayError>,
    },
    OutcomeReported {
        session_id: SessionId,
        outcome: Outcome,
        result: Result<String, GatewayError>,
    },
}

type Reply = oneshot::Sender<GameSession>;

/// Cheap, cloneable front door to a running session controller
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<(SessionCommand, Reply)>,
    state: watch::Receiver<GameSession>,
    events: broadcast::Sender<DomainEvent<SessionEvent>>,
}

impl SessionHandle {
    pub async fn start_registration(
        &self,
        contest_id: ContestId,
        rules: ContestRules,
    ) -> Result<GameSession, ControllerStopped> {
        self.send(SessionCommand::StartRegistration { contest_id, rules }).await
    }

    pub async fn submit_registration(
        &self,
        participant: Participant,
    ) -> Result<GameSession, ControllerStopped> {
        self.send(SessionCommand::SubmitRegistration(participant)).await
    }

    /// `None` stands for an empty input field
    pub async fn submit_guess(&self, value: Option<i64>) -> Result<GameSession, ControllerStopped> {
        self.send(SessionCommand::SubmitGuess(value)).await
    }

    pub async fn close(&self) -> Result<GameSession, ControllerStopped> {
        self.send(SessionCommand::Close).await
    }

    /// Latest published state
    pub fn snapshot(&self) -> GameSession {
        self.state.borrow().clone()
    }

    pub fn subscribe_state(&self) -> watch::Receiver<GameSession> {
        self.state.clone()
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<DomainEvent<SessionEvent>> {
        self.events.subscribe()
    }

    async fn send(&self, command: SessionCommand) -> Result<GameSession, ControllerStopped> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send((command, reply_tx))
            .await
            .map_err(|_| ControllerStopped)?;
        reply_rx.await.map_err(|_| ControllerStopped)
    }
}

/// Single writer of a `GameSession`.
///
/// Runs as one tokio task. View commands, timer ticks and collaborator
/// responses all arrive as messages, so the session is never touched
/// concurrently. Responses are tagged with the generation that issued them;
/// anything from an older generation is dropped.
pub struct SessionController {
    session: GameSession,
    ports: SessionPorts,
    timer: SessionTimer,
    generation: u64,
    in_flight: CancellationToken,
    internal_tx: mpsc::Sender<Internal>,
    state_tx: watch::Sender<GameSession>,
    events: broadcast::Sender<DomainEvent<SessionEvent>>,
}

impl SessionController {
    /// Start a controller with a blank registration for `contest_id`
    pub fn spawn(
        contest_id: ContestId,
        rules: ContestRules,
        ports: SessionPorts,
        config: ControllerConfig,
    ) -> SessionHandle {
        let session = GameSession::new(contest_id, rules).with_policy(config.policy);
        let (command_tx, command_rx) = mpsc::channel(64);
        let (internal_tx, internal_rx) = mpsc::channel(64);
        let (state_tx, state_rx) = watch::channel(session.clone());
        let (events, _) = broadcast::channel(32);

        info!(
            "Session {} created for contest {}",
            session.id(),
            session.contest_id()
        );

        let controller = SessionController {
            session,
            ports,
            timer: SessionTimer::new(config.tick_period),
            generation: 0,
            in_flight: CancellationToken::new(),
            internal_tx,
            state_tx,
            events: events.clone(),
        };
        tokio::spawn(controller.run(command_rx, internal_rx));

        SessionHandle {
            commands: command_tx,
            state: state_rx,
            events,
        }
    }

    async fn run(
        mut self,
        mut commands: mpsc::Receiver<(SessionCommand, Reply)>,
        mut internal: mpsc::Receiver<Internal>,
    ) {
        loop {
            tokio::select! {
                command = commands.recv() => match command {
                    Some((command, reply)) => {
                        self.handle_command(command);
                        let _ = reply.send(self.session.clone());
                    }
                    None => break,
                },
                Some(message) = internal.recv() => self.handle_internal(message),
            }
        }

        // Every handle is gone
        self.timer.stop();
        self.in_flight.cancel();
        debug!("Session controller for {} ended", self.session.id());
    }

    fn handle_command(&mut self, command: SessionCommand) {
        match command {
            SessionCommand::StartRegistration { contest_id, rules } => {
                self.next_generation();
                let effects = self.session.start_registration(contest_id, rules);
                info!(
                    "Session {} waiting for registration on contest {}",
                    self.session.id(),
                    self.session.contest_id()
                );
                self.apply(effects);
            }
            SessionCommand::SubmitRegistration(participant) => {
                let effects = self.session.submit_registration(participant);
                self.apply(effects);
            }
            SessionCommand::SubmitGuess(value) => {
                let effects = self.session.submit_guess(value);
                self.apply(effects);
            }
            SessionCommand::Close => {
                let closed = self.session.id().clone();
                self.next_generation();
                let effects = self.session.close();
                self.apply(effects);
                info!("Session {} closed", closed);
                let _ = self
                    .events
                    .send(DomainEvent::new(SessionEvent::Closed { session_id: closed }));
            }
        }
    }

    fn handle_internal(&mut self, message: Internal) {
        match message {
            Internal::Tick { generation } => {
                if generation != self.generation {
                    return;
                }
                let effects = self.session.tick();
                trace!(
                    "Session {} tick {}s",
                    self.session.id(),
                    self.session.elapsed_seconds()
                );
                self.apply(effects);
            }
            Internal::ParticipationChecked { generation, result } => {
                if generation != self.generation {
                    debug!("Dropping participation check from an abandoned session");
                    return;
                }
                let effects = match result {
                    Ok(status) => {
                        if status.already_participated {
                            info!("Session {} refused: already participated", self.session.id());
                        }
                        self.session.participation_confirmed(status)
                    }
                    Err(e) => {
                        warn!(
                            "Participation check failed for session {}: {}",
                            self.session.id(),
                            e
                        );
                        self.session.participation_check_failed()
                    }
                };
                self.apply(effects);
            }
            Internal::GuessEvaluated { generation, attempt, result } => {
                if generation != self.generation {
                    debug!("Dropping evaluation of attempt {} from an abandoned session", attempt);
                    return;
                }
                let effects = match result {
                    Ok(evaluation) => {
                        debug!(
                            "Session {} attempt {} evaluated as {:?}",
                            self.session.id(),
                            attempt,
                            evaluation.verdict
                        );
                        self.session.guess_evaluated(attempt, evaluation)
                    }
                    Err(e) => {
                        warn!(
                            "Could not verify attempt {} of session {}: {}",
                            attempt,
                            self.session.id(),
                            e
                        );
                        self.session.evaluation_failed(attempt)
                    }
                };
                self.apply(effects);
            }
            Internal::OutcomeReported { session_id, outcome, result } => {
                let event = match result {
                    Ok(ack) => {
                        info!("Outcome of session {} stored", session_id);
                        SessionEvent::OutcomeReported {
                            session_id,
                            outcome,
                            message: report_message(outcome, ack),
                        }
                    }
                    Err(e) => {
                        warn!("Could not store outcome of session {}: {}", session_id, e);
                        SessionEvent::OutcomeReportFailed {
                            session_id,
                            outcome,
                            reason: "Your result could not be saved.".to_string(),
                        }
                    }
                };
                let _ = self.events.send(DomainEvent::new(event));
            }
        }
    }

    fn apply(&mut self, effects: Vec<SessionEffect>) {
        for effect in effects {
            match effect {
                SessionEffect::CheckParticipation { email } => {
                    let registry = Arc::clone(&self.ports.registry);
                    let contest_id = self.session.contest_id().clone();
                    let generation = self.generation;
                    self.spawn_cancellable(async move {
                        let result = registry.check_participation(&contest_id, &email).await;
                        Internal::ParticipationChecked { generation, result }
                    });
                }
                SessionEffect::StartTimer => {
                    info!(
                        "Session {} playing: {}..={} in {} attempts",
                        self.session.id(),
                        self.session.rules().min_value(),
                        self.session.rules().max_value(),
                        self.session.rules().max_attempts()
                    );
                    let generation = self.generation;
                    self.timer
                        .start(self.internal_tx.clone(), move || Internal::Tick { generation });
                }
                SessionEffect::StopTimer => self.timer.stop(),
                SessionEffect::Evaluate { attempt, value } => {
                    let evaluator = Arc::clone(&self.ports.evaluator);
                    let contest_id = self.session.contest_id().clone();
                    let generation = self.generation;
                    self.spawn_cancellable(async move {
                        let result = evaluator.evaluate(&contest_id, value).await;
                        Internal::GuessEvaluated { generation, attempt, result }
                    });
                }
                SessionEffect::Finalize(summary) => self.finalize(summary),
            }
        }
        self.state_tx.send_replace(self.session.clone());
    }

    /// Report the outcome in the background. Not tied to the in-flight token:
    /// closing the view right after the game ends must not lose the result.
    fn finalize(&self, summary: SessionSummary) {
        info!(
            "Session {} finished: {:?} after {} attempts in {}s",
            summary.session_id,
            summary.outcome,
            summary.attempt_count,
            summary.elapsed_seconds
        );
        let reporter = Arc::clone(&self.ports.reporter);
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            let result = reporter.report(&summary).await;
            let _ = tx
                .send(Internal::OutcomeReported {
                    session_id: summary.session_id,
                    outcome: summary.outcome,
                    result,
                })
                .await;
        });
    }

    fn spawn_cancellable<F>(&self, call: F)
    where
        F: Future<Output = Internal> + Send + 'static,
    {
        let cancelled = self.in_flight.clone();
        let tx = self.internal_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                _ = cancelled.cancelled() => {}
                message = call => {
                    let _ = tx.send(message).await;
                }
            }
        });
    }

    /// Abandon everything issued for the current session
    fn next_generation(&mut self) {
        self.generation += 1;
        self.in_flight.cancel();
        self.in_flight = CancellationToken::new();
    }
}

fn report_message(outcome: Outcome, ack: String) -> String {
    if !ack.trim().is_empty() {
        return ack;
    }
    if outcome.has_won() {
        "Your win has been recorded. Congratulations!".to_string()
    } else {
        "Thanks for playing! Your participation has been recorded.".to_string()
    }
}
