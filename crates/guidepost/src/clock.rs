#![forbid(unsafe_code)]

//! Monotonic time sources and the pending-timer queue.
//!
//! The engine never sleeps and never spawns threads. Delays are entries in a
//! [`TimerQueue`] stamped with the transition epoch that scheduled them. The
//! host drives time forward and the controller fires whatever has come due.

use web_time::{Duration, Instant};

/// A monotonic clock.
pub trait Clock {
    /// Time elapsed since an arbitrary fixed origin.
    fn now_mono(&self) -> Duration;
}

/// Deterministic monotonic clock controlled by the host.
#[derive(Debug, Default, Clone)]
pub struct DeterministicClock {
    now: Duration,
}

impl DeterministicClock {
    /// Create a clock starting at `0`.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            now: Duration::ZERO,
        }
    }

    /// Set current monotonic time.
    pub fn set(&mut self, now: Duration) {
        self.now = now;
    }

    /// Advance monotonic time by `dt`.
    pub fn advance(&mut self, dt: Duration) {
        self.now = self.now.saturating_add(dt);
    }
}

impl Clock for DeterministicClock {
    fn now_mono(&self) -> Duration {
        self.now
    }
}

/// Wall-clock monotonic time (works on `wasm32` through `web-time`).
#[derive(Debug, Clone)]
pub struct MonotonicClock {
    origin: Instant,
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Clock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// What a timer does when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    /// Mutation delay elapsed: measure the target and scroll to it.
    Scroll,
    /// Settle window elapsed: recompute highlight and message geometry.
    Settle,
    /// Scroll animation is over: re-apply the scroll block.
    ResumeLock,
}

/// A scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub due: Duration,
    pub epoch: u64,
    pub action: TimerAction,
}

/// Pending timers ordered by due time (FIFO among equal due times).
#[derive(Debug, Clone, Default)]
pub struct TimerQueue {
    pending: Vec<Timer>,
}

impl TimerQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due: Duration, epoch: u64, action: TimerAction) {
        let at = self.pending.partition_point(|t| t.due <= due);
        self.pending.insert(at, Timer { due, epoch, action });
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<Timer> {
        if self.pending.first().is_some_and(|t| t.due <= now) {
            Some(self.pending.remove(0))
        } else {
            None
        }
    }

    /// Drop every timer not stamped with `epoch`. Returns how many were dropped.
    pub fn retain_epoch(&mut self, epoch: u64) -> usize {
        let before = self.pending.len();
        self.pending.retain(|t| t.epoch == epoch);
        before - self.pending.len()
    }

    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        dropped
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    /// Due time of the next timer, if any.
    #[must_use]
    pub fn next_due(&self) -> Option<Duration> {
        self.pending.first().map(|t| t.due)
    }

    /// Whether a timer with `action` is pending for `epoch`.
    #[must_use]
    pub fn has_pending(&self, epoch: u64, action: TimerAction) -> bool {
        self.pending
            .iter()
            .any(|t| t.epoch == epoch && t.action == action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn deterministic_clock_advances() {
        let mut clock = DeterministicClock::new();
        clock.advance(ms(50));
        clock.advance(ms(25));
        assert_eq!(clock.now_mono(), ms(75));
        clock.set(ms(10));
        assert_eq!(clock.now_mono(), ms(10));
    }

    #[test]
    fn queue_pops_in_due_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(600), 1, TimerAction::Settle);
        queue.schedule(ms(50), 1, TimerAction::Scroll);
        queue.schedule(ms(600), 1, TimerAction::ResumeLock);

        assert_eq!(queue.next_due(), Some(ms(50)));
        assert!(queue.pop_due(ms(49)).is_none());
        assert_eq!(queue.pop_due(ms(700)).map(|t| t.action), Some(TimerAction::Scroll));
        assert_eq!(queue.pop_due(ms(700)).map(|t| t.action), Some(TimerAction::Settle));
        assert_eq!(
            queue.pop_due(ms(700)).map(|t| t.action),
            Some(TimerAction::ResumeLock)
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn retain_epoch_drops_stale() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(10), 1, TimerAction::Scroll);
        queue.schedule(ms(20), 2, TimerAction::Scroll);
        assert_eq!(queue.retain_epoch(2), 1);
        assert!(queue.has_pending(2, TimerAction::Scroll));
        assert!(!queue.has_pending(1, TimerAction::Scroll));
        assert_eq!(queue.cancel_all(), 1);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let clock = MonotonicClock::new();
        let a = clock.now_mono();
        let b = clock.now_mono();
        assert!(b >= a);
    }
}
