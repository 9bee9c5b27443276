//! Exponential backoff policy for reconnect scheduling.
//!
//! Pure state machine, no timers. The connection supervisor asks for the
//! next delay after every failed attempt and resets after every successful
//! open, so a flapping connection pays an increasing price while a stable
//! one always starts over at the base delay.

use std::time::Duration;

/// Default starting delay between reconnect attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(500);

/// Default ceiling for the reconnect delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_millis(8000);

/// Growth factor applied after each attempt.
const MULTIPLIER: u32 = 2;

/// Exponential backoff state for a single connection.
///
/// Invariant: `base <= current <= max` at all times. Each supervisor owns
/// its own instance; backoff state is never shared across channels.
#[derive(Debug, Clone)]
pub struct Backoff {
    base: Duration,
    max: Duration,
    current: Duration,
}

impl Backoff {
    /// Creates a backoff policy with the given base and ceiling.
    ///
    /// A base larger than the ceiling is clamped down to it.
    pub fn new(base: Duration, max: Duration) -> Self {
        let base = base.min(max);
        Self {
            base,
            max,
            current: base,
        }
    }

    /// Returns the delay to wait before the next attempt, then doubles the
    /// stored delay (capped at the ceiling).
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = self.current.saturating_mul(MULTIPLIER).min(self.max);
        delay
    }

    /// Resets the delay to the base value. Called on every successful open.
    pub fn reset(&mut self) {
        self.current = self.base;
    }

    /// The delay the next call to [`next_delay`](Self::next_delay) will return.
    pub fn current(&self) -> Duration {
        self.current
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_doubles_until_capped() {
        let mut backoff = Backoff::default();

        let delays: Vec<u64> = (0..6)
            .map(|_| backoff.next_delay().as_millis() as u64)
            .collect();

        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 8000]);
    }

    #[test]
    fn test_reset_returns_to_base() {
        let mut backoff = Backoff::default();
        backoff.next_delay();
        backoff.next_delay();
        assert_eq!(backoff.current(), Duration::from_millis(2000));

        backoff.reset();
        assert_eq!(backoff.current(), DEFAULT_BASE_DELAY);
        assert_eq!(backoff.next_delay(), DEFAULT_BASE_DELAY);
    }

    #[test]
    fn test_current_never_exceeds_max() {
        let mut backoff = Backoff::new(Duration::from_millis(300), Duration::from_millis(1000));
        for _ in 0..20 {
            backoff.next_delay();
            assert!(backoff.current() <= Duration::from_millis(1000));
            assert!(backoff.current() >= Duration::from_millis(300));
        }
    }

    #[test]
    fn test_base_larger_than_max_is_clamped() {
        let mut backoff = Backoff::new(Duration::from_secs(10), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.current(), Duration::from_secs(2));
    }
}
