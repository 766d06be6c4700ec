//! Per-question countdown with an injectable clock.
//!
//! The countdown owns no thread. Callers feed it the current time from a
//! [`Clock`] and poll for expiry, or attach a [`TimerAlarm`] that pushes the
//! expiry into the session queue (see the `async` feature).
//!
//! ```text
//! Idle -> Armed -> (Cancelled | Expired) -> Idle
//! ```

#[cfg(feature = "async")]
pub mod driver;

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::numbers::ceil_secs;

/// Source of monotonic time, measured from an arbitrary per-clock epoch.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock. Clones share the same time source.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    millis: Arc<AtomicU64>,
}

impl ManualClock {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        let step = u64::try_from(by.as_millis()).unwrap_or(u64::MAX);
        self.millis.fetch_add(step, Ordering::SeqCst);
    }

    pub fn set(&self, at: Duration) {
        let value = u64::try_from(at.as_millis()).unwrap_or(u64::MAX);
        self.millis.store(value, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }
}

/// Identity of one armed countdown. A new handle is issued per start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    handle: TimerHandle,
    deadline: Duration,
}

/// Single-slot countdown. Starting a new countdown replaces the armed one.
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    next_id: u64,
    armed: Option<Armed>,
}

impl Countdown {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm a countdown that expires `duration` after `now`.
    pub fn start(&mut self, duration: Duration, now: Duration) -> TimerHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = TimerHandle(self.next_id);
        self.armed = Some(Armed {
            handle,
            deadline: now.saturating_add(duration),
        });
        handle
    }

    /// Cancel the countdown identified by `handle`. Returns false for stale handles.
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        if self.is_armed(handle) {
            self.armed = None;
            true
        } else {
            false
        }
    }

    /// Cancel whatever is armed, returning its handle.
    pub fn cancel_any(&mut self) -> Option<TimerHandle> {
        self.armed.take().map(|armed| armed.handle)
    }

    #[must_use]
    pub fn is_armed(&self, handle: TimerHandle) -> bool {
        self.armed.is_some_and(|armed| armed.handle == handle)
    }

    #[must_use]
    pub fn current(&self) -> Option<TimerHandle> {
        self.armed.map(|armed| armed.handle)
    }

    /// Yield the armed handle once its deadline has passed. Fires at most once.
    pub fn poll(&mut self, now: Duration) -> Option<TimerHandle> {
        let armed = self.armed?;
        if now >= armed.deadline {
            self.armed = None;
            Some(armed.handle)
        } else {
            None
        }
    }

    #[must_use]
    pub fn remaining(&self, now: Duration) -> Option<Duration> {
        self.armed
            .map(|armed| armed.deadline.saturating_sub(now))
    }

    /// Whole seconds left, rounded up, for a countdown display.
    #[must_use]
    pub fn remaining_secs(&self, now: Duration) -> u64 {
        self.remaining(now)
            .map_or(0, |left| ceil_secs(left.as_millis()))
    }
}

/// Push-style expiry delivery layered over [`Countdown`] bookkeeping.
pub trait TimerAlarm {
    /// Deliver an expiry for `handle` after `duration` unless disarmed first.
    fn arm(&mut self, handle: TimerHandle, duration: Duration);

    fn disarm(&mut self, handle: TimerHandle);
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIVE: Duration = Duration::from_secs(5);

    #[test]
    fn expires_once_after_duration() {
        let clock = ManualClock::new();
        let mut countdown = Countdown::new();
        let handle = countdown.start(FIVE, clock.now());

        clock.advance(Duration::from_millis(4_999));
        assert_eq!(countdown.poll(clock.now()), None);
        assert_eq!(countdown.remaining_secs(clock.now()), 1);

        clock.advance(Duration::from_millis(1));
        assert_eq!(countdown.poll(clock.now()), Some(handle));
        assert_eq!(countdown.poll(clock.now()), None);
    }

    #[test]
    fn cancel_prevents_expiry() {
        let clock = ManualClock::new();
        let mut countdown = Countdown::new();
        let handle = countdown.start(FIVE, clock.now());
        assert!(countdown.cancel(handle));
        assert!(!countdown.cancel(handle));
        clock.advance(FIVE * 2);
        assert_eq!(countdown.poll(clock.now()), None);
    }

    #[test]
    fn restart_issues_fresh_handle_and_stales_old() {
        let clock = ManualClock::new();
        let mut countdown = Countdown::new();
        let first = countdown.start(FIVE, clock.now());
        let second = countdown.start(FIVE, clock.now());
        assert_ne!(first, second);
        assert!(!countdown.is_armed(first));
        assert!(!countdown.cancel(first));
        assert_eq!(countdown.current(), Some(second));
    }

    #[test]
    fn remaining_counts_down_in_whole_seconds() {
        let clock = ManualClock::new();
        let mut countdown = Countdown::new();
        countdown.start(FIVE, clock.now());
        assert_eq!(countdown.remaining_secs(clock.now()), 5);
        clock.advance(Duration::from_millis(1_200));
        assert_eq!(countdown.remaining_secs(clock.now()), 4);
        assert_eq!(countdown.cancel_any().map(TimerHandle::id), Some(1));
        assert_eq!(countdown.remaining_secs(clock.now()), 0);
    }

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let shared = clock.clone();
        clock.set(Duration::from_secs(3));
        assert_eq!(shared.now(), Duration::from_secs(3));
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }
}
