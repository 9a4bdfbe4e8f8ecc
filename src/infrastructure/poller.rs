//! Live refresh driver
//!
//! A cancellable periodic task keyed by a liveness predicate, modeled
//! explicitly as a two-state machine: `Idle` (no timer) and `Polling`
//! (timer armed). Starting and stopping are the only transitions; the
//! runtime re-evaluates the predicate after every state change and calls
//! [`Poller::sync_to`].

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::core::msg::SyncMsg;

/// Driver phase. There is deliberately no "paused" or "backoff" state:
/// a fetch failure keeps the timer running and the next tick retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerPhase {
    Idle,
    Polling,
}

/// Emits [`SyncMsg::PollTick`] on a fixed interval while active.
///
/// The poller does not fetch anything itself — ticks go through the
/// update function, which decides whether a fetch command is warranted.
/// Stopping clears the timer immediately; fetches already in flight are
/// not aborted (page-1 reads are idempotent and stale responses merge
/// harmlessly).
pub struct Poller {
    interval: Duration,
    msg_tx: mpsc::UnboundedSender<SyncMsg>,
    task: Option<(JoinHandle<()>, CancellationToken)>,
}

impl Poller {
    pub fn new(msg_tx: mpsc::UnboundedSender<SyncMsg>, interval: Duration) -> Self {
        Self {
            interval,
            msg_tx,
            task: None,
        }
    }

    pub fn phase(&self) -> PollerPhase {
        if self.task.is_some() {
            PollerPhase::Polling
        } else {
            PollerPhase::Idle
        }
    }

    /// Drive the state machine toward what the liveness predicate says.
    /// Idempotent: re-asserting the current phase does not re-arm the
    /// timer.
    pub fn sync_to(&mut self, should_poll: bool) {
        match (self.phase(), should_poll) {
            (PollerPhase::Idle, true) => self.start(),
            (PollerPhase::Polling, false) => self.stop(),
            _ => {}
        }
    }

    fn start(&mut self) {
        let cancel = CancellationToken::new();
        let child = cancel.clone();
        let msg_tx = self.msg_tx.clone();
        let period = self.interval;

        let handle = tokio::spawn(async move {
            // The transition into Polling already refreshed once (the
            // update function fetches on gaining liveness), so the
            // first tick waits a full period.
            let start = tokio::time::Instant::now() + period;
            let mut ticker = tokio::time::interval_at(start, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = child.cancelled() => break,
                    _ = ticker.tick() => {
                        if msg_tx.send(SyncMsg::PollTick).is_err() {
                            // Receiver gone: the view has shut down.
                            break;
                        }
                    }
                }
            }
        });

        self.task = Some((handle, cancel));
        tracing::debug!(period_secs = period.as_secs_f64(), "poller armed");
    }

    fn stop(&mut self) {
        if let Some((handle, cancel)) = self.task.take() {
            cancel.cancel();
            handle.abort();
            tracing::debug!("poller disarmed");
        }
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_phase_transitions() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut poller = Poller::new(tx, Duration::from_secs(60));

        assert_eq!(poller.phase(), PollerPhase::Idle);

        poller.sync_to(true);
        assert_eq!(poller.phase(), PollerPhase::Polling);

        // Re-asserting does not change phase.
        poller.sync_to(true);
        assert_eq!(poller.phase(), PollerPhase::Polling);

        poller.sync_to(false);
        assert_eq!(poller.phase(), PollerPhase::Idle);

        poller.sync_to(false);
        assert_eq!(poller.phase(), PollerPhase::Idle);
    }

    #[tokio::test]
    async fn test_ticks_arrive_while_polling() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut poller = Poller::new(tx, Duration::from_millis(10));

        poller.sync_to(true);

        let tick = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("a tick before the timeout");
        assert_eq!(tick, Some(SyncMsg::PollTick));
    }

    #[tokio::test]
    async fn test_stop_clears_timer() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut poller = Poller::new(tx, Duration::from_millis(10));

        poller.sync_to(true);
        let _ = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;

        poller.sync_to(false);
        assert_eq!(poller.phase(), PollerPhase::Idle);

        // Drain anything emitted before the stop, then expect silence.
        while rx.try_recv().is_ok() {}
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(rx.try_recv().is_err());
    }
}
