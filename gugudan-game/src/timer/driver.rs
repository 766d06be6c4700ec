//! Tokio-backed timer delivery for interactive shells.
//!
//! [`AsyncAlarm`] turns each armed countdown into a sleeping task that posts
//! [`SessionInput::TimerExpired`] back onto the session queue. Disarming aborts
//! the task, and the session ignores any expiry whose handle is no longer armed.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::{Clock, TimerAlarm, TimerHandle};
use crate::constants::LOG_TARGET_TIMER;
use crate::session::SessionInput;

/// Clock that follows tokio's time source, including paused test time.
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
    origin: Instant,
}

impl TokioClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for TokioClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for TokioClock {
    fn now(&self) -> Duration {
        Instant::now().saturating_duration_since(self.origin)
    }
}

#[derive(Debug)]
pub struct AsyncAlarm {
    tx: UnboundedSender<SessionInput>,
    pending: Option<(TimerHandle, JoinHandle<()>)>,
}

impl AsyncAlarm {
    #[must_use]
    pub const fn new(tx: UnboundedSender<SessionInput>) -> Self {
        Self { tx, pending: None }
    }

    fn abort_pending(&mut self) {
        if let Some((_, task)) = self.pending.take() {
            task.abort();
        }
    }
}

impl TimerAlarm for AsyncAlarm {
    fn arm(&mut self, handle: TimerHandle, duration: Duration) {
        self.abort_pending();
        // Deadline is fixed here, not when the task is first polled.
        let deadline = Instant::now() + duration;
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if tx.send(SessionInput::TimerExpired { handle }).is_err() {
                log::debug!(target: LOG_TARGET_TIMER, "session queue closed before expiry");
            }
        });
        self.pending = Some((handle, task));
    }

    fn disarm(&mut self, handle: TimerHandle) {
        if self
            .pending
            .as_ref()
            .is_some_and(|(armed, _)| *armed == handle)
        {
            self.abort_pending();
        }
    }
}

impl Drop for AsyncAlarm {
    fn drop(&mut self) {
        self.abort_pending();
    }
}

/// Post [`SessionInput::Tick`] every `period` until the queue closes.
pub fn spawn_ticker(tx: UnboundedSender<SessionInput>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            if tx.send(SessionInput::Tick).is_err() {
                break;
            }
        }
    })
}
