//! Explicit timer handles driven by caller-supplied time.
//!
//! Nothing here reads the clock. The owner passes `now` into every call, so
//! the same code runs under the event loop and in deterministic tests.

use std::time::{Duration, Instant};

/// A one-shot deadline that can be rescheduled or cancelled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CancellableTimer {
    deadline: Option<Instant>,
}

impl CancellableTimer {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer to fire `delay` after `now`, replacing any earlier deadline.
    pub fn schedule(&mut self, now: Instant, delay: Duration) {
        self.deadline = Some(now + delay);
    }

    /// Disarm the timer. Idempotent.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Whether the timer is armed.
    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Current deadline, if armed.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fire if the deadline has passed. Disarms on fire.
    ///
    /// Returns `true` exactly once per scheduled deadline.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Trailing-edge debouncer carrying the latest payload.
///
/// Each `schedule` supersedes the previous one: only the last payload of a
/// burst is released, `delay` after the last call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Debouncer<T> {
    delay: Duration,
    timer: CancellableTimer,
    pending: Option<T>,
}

impl<T> Debouncer<T> {
    /// Create a debouncer with the given quiet window.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            timer: CancellableTimer::new(),
            pending: None,
        }
    }

    /// Quiet window.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Replace the pending payload and restart the window.
    pub fn schedule(&mut self, now: Instant, payload: T) {
        self.pending = Some(payload);
        self.timer.schedule(now, self.delay);
    }

    /// Drop the pending payload.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.timer.cancel();
    }

    /// Whether a payload is waiting.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending payload.
    pub fn deadline(&self) -> Option<Instant> {
        self.timer.deadline()
    }

    /// Release the payload if the window has elapsed.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<T> {
        if self.timer.fire_if_due(now) {
            self.pending.take()
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn timer_fires_once_at_deadline() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule(t0, 200 * MS);

        assert!(!timer.fire_if_due(t0 + 199 * MS));
        assert!(timer.fire_if_due(t0 + 200 * MS));
        assert!(!timer.fire_if_due(t0 + 500 * MS), "Must not fire twice");
        assert!(!timer.is_armed());
    }

    #[test]
    fn cancelled_timer_never_fires() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule(t0, 10 * MS);
        timer.cancel();
        timer.cancel();

        assert!(!timer.fire_if_due(t0 + 100 * MS));
        assert_eq!(timer.deadline(), None);
    }

    #[test]
    fn rescheduling_moves_deadline() {
        let t0 = Instant::now();
        let mut timer = CancellableTimer::new();
        timer.schedule(t0, 10 * MS);
        timer.schedule(t0 + 5 * MS, 10 * MS);

        assert!(!timer.fire_if_due(t0 + 12 * MS));
        assert!(timer.fire_if_due(t0 + 15 * MS));
    }

    #[test]
    fn debouncer_releases_only_last_payload_of_burst() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(350 * MS);
        debouncer.schedule(t0, "R");
        debouncer.schedule(t0 + 100 * MS, "Ro");
        debouncer.schedule(t0 + 200 * MS, "Rom");

        assert_eq!(debouncer.fire_if_due(t0 + 400 * MS), None, "Window restarts");
        assert_eq!(debouncer.fire_if_due(t0 + 550 * MS), Some("Rom"));
        assert_eq!(debouncer.fire_if_due(t0 + 1000 * MS), None);
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn debouncer_cancel_drops_payload() {
        let t0 = Instant::now();
        let mut debouncer = Debouncer::new(350 * MS);
        debouncer.schedule(t0, 1);
        debouncer.cancel();

        assert_eq!(debouncer.fire_if_due(t0 + 1000 * MS), None);
        assert_eq!(debouncer.deadline(), None);
    }
}
