use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Periodic tick source for a playing session.
///
/// The timer has no notion of a time limit: it ticks until `stop` is called.
/// `start` and `stop` are both idempotent.
pub struct SessionTimer {
    period: Duration,
    running: Option<CancellationToken>,
}

impl SessionTimer {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            running: None,
        }
    }

    /// Send `make_tick()` into `sink` once per period. Does nothing when the
    /// timer is already running.
    pub fn start<T, F>(&mut self, sink: mpsc::Sender<T>, make_tick: F)
    where
        T: Send + 'static,
        F: Fn() -> T + Send + 'static,
    {
        if self.is_running() {
            return;
        }

        let token = CancellationToken::new();
        let cancelled = token.clone();
        let period = self.period;
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => break,
                    _ = ticker.tick() => {
                        if sink.send(make_tick()).await.is_err() {
                            break;
                        }
                    }
                }
            }
            debug!("Session timer stopped");
        });
        self.running = Some(token);
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.running.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }
}

impl Drop for SessionTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(rx: &mut mpsc::Receiver<u32>) -> usize {
        let mut count = 0;
        while rx.try_recv().is_ok() {
            count += 1;
        }
        count
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = SessionTimer::new(Duration::from_secs(1));
        timer.start(tx, || 1u32);

        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(drain(&mut rx), 3);
        assert!(timer.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_single_ticker() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = SessionTimer::new(Duration::from_secs(1));
        timer.start(tx.clone(), || 1u32);
        timer.start(tx, || 2u32);

        tokio::time::sleep(Duration::from_millis(2500)).await;
        let mut seen = Vec::new();
        while let Ok(tick) = rx.try_recv() {
            seen.push(tick);
        }
        assert_eq!(seen, vec![1, 1]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let (tx, mut rx) = mpsc::channel(16);
        let mut timer = SessionTimer::new(Duration::from_secs(1));
        timer.start(tx, || 1u32);

        tokio::time::sleep(Duration::from_millis(1500)).await;
        timer.stop();
        timer.stop();
        assert!(!timer.is_running());
        assert_eq!(drain(&mut rx), 1);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(drain(&mut rx), 0);
    }

    #[tokio::test]
    async fn test_stop_without_start_is_harmless() {
        let mut timer = SessionTimer::new(Duration::from_secs(1));
        timer.stop();
        assert!(!timer.is_running());
    }
}
