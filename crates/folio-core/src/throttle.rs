#![forbid(unsafe_code)]

//! Interval throttle driven by a host clock.
//!
//! Fires on the leading edge, then holds the latest value offered during the
//! cooldown and releases it once the interval has elapsed. Unlike a plain
//! "drop while cooling down" throttle, the final value of a burst is never
//! lost, so throttling changes responsiveness but never the settled state.
//!
//! Time is passed in explicitly as a monotonic [`Duration`]; nothing here
//! reads a system clock, which keeps it usable on `wasm32-unknown-unknown`
//! and deterministic in tests.

use core::time::Duration;

/// Leading-edge throttle with a latest-wins trailing value.
#[derive(Debug, Clone)]
pub struct Throttle<T> {
    interval: Duration,
    last_fire: Option<Duration>,
    pending: Option<T>,
    superseded: u64,
}

impl<T> Throttle<T> {
    /// Create a throttle that fires at most once per `interval`.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_fire: None,
            pending: None,
            superseded: 0,
        }
    }

    /// Configured interval.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Offer a value at time `now`.
    ///
    /// Returns the value when the throttle is open; otherwise stores it as the
    /// pending trailing value (replacing any older one) and returns `None`.
    pub fn offer(&mut self, value: T, now: Duration) -> Option<T> {
        if self.is_open(now) {
            self.last_fire = Some(now);
            if self.pending.take().is_some() {
                self.superseded = self.superseded.saturating_add(1);
            }
            Some(value)
        } else {
            if self.pending.replace(value).is_some() {
                self.superseded = self.superseded.saturating_add(1);
            }
            None
        }
    }

    /// Release the pending trailing value if the interval has elapsed.
    pub fn poll(&mut self, now: Duration) -> Option<T> {
        if self.pending.is_some() && self.is_open(now) {
            self.last_fire = Some(now);
            self.pending.take()
        } else {
            None
        }
    }

    /// Whether a trailing value is waiting.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Time at which a pending value becomes releasable.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.as_ref()?;
        Some(
            self.last_fire
                .map_or(Duration::ZERO, |t| t.saturating_add(self.interval)),
        )
    }

    /// Count of values replaced before they were delivered.
    #[must_use]
    pub const fn superseded(&self) -> u64 {
        self.superseded
    }

    /// Forget timing history and any pending value.
    pub fn reset(&mut self) {
        self.last_fire = None;
        self.pending = None;
    }

    fn is_open(&self, now: Duration) -> bool {
        match self.last_fire {
            None => true,
            Some(last) => now.saturating_sub(last) >= self.interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn leading_edge_fires_immediately() {
        let mut t = Throttle::new(ms(100));
        assert_eq!(t.offer(1, ms(0)), Some(1));
        assert!(!t.has_pending());
    }

    #[test]
    fn cooldown_holds_latest() {
        let mut t = Throttle::new(ms(100));
        assert_eq!(t.offer(1, ms(0)), Some(1));
        assert_eq!(t.offer(2, ms(10)), None);
        assert_eq!(t.offer(3, ms(20)), None);
        assert_eq!(t.superseded(), 1);
        assert_eq!(t.next_deadline(), Some(ms(100)));

        assert_eq!(t.poll(ms(99)), None);
        assert_eq!(t.poll(ms(100)), Some(3));
        assert!(!t.has_pending());
        assert_eq!(t.poll(ms(500)), None);
    }

    #[test]
    fn offer_after_interval_drops_stale_pending() {
        let mut t = Throttle::new(ms(50));
        t.offer(1, ms(0));
        t.offer(2, ms(10));
        // Fresh value supersedes the stale trailing one.
        assert_eq!(t.offer(3, ms(60)), Some(3));
        assert!(!t.has_pending());
        assert_eq!(t.superseded(), 1);
    }

    #[test]
    fn zero_interval_never_throttles() {
        let mut t = Throttle::new(Duration::ZERO);
        assert_eq!(t.offer(1, ms(5)), Some(1));
        assert_eq!(t.offer(2, ms(5)), Some(2));
    }

    #[test]
    fn reset_forgets_history() {
        let mut t = Throttle::new(ms(100));
        t.offer(1, ms(0));
        t.offer(2, ms(1));
        t.reset();
        assert!(!t.has_pending());
        assert_eq!(t.next_deadline(), None);
        assert_eq!(t.offer(3, ms(2)), Some(3));
    }

    #[test]
    fn clock_going_backwards_does_not_panic() {
        let mut t = Throttle::new(ms(100));
        t.offer(1, ms(500));
        assert_eq!(t.offer(2, ms(100)), None);
        assert_eq!(t.poll(ms(600)), Some(2));
    }
}
