//! Bounded backoff for reconnection attempts

use std::time::Duration;

use gw_core::config::ReconnectConfig;

/// Growing delay schedule with a bounded number of attempts.
///
/// Each call to [`Backoff::next_delay`] consumes one attempt; `None` means
/// the bound is exhausted and the channel settles disconnected until an
/// explicit reconnect.
pub struct Backoff {
    /// Current delay
    current: Duration,
    /// Multiplier applied per attempt
    multiplier: f64,
    /// Jitter factor (0.0 to 1.0)
    jitter: f64,
    /// Attempts left
    remaining: u32,
}

impl Backoff {
    /// Create a new backoff from configuration
    pub fn from_config(config: &ReconnectConfig) -> Self {
        Self {
            current: config.base_delay,
            multiplier: config.multiplier,
            jitter: config.jitter,
            remaining: config.max_attempts,
        }
    }

    /// Create a new backoff with custom parameters
    pub fn new(base: Duration, multiplier: f64, jitter: f64, attempts: u32) -> Self {
        Self {
            current: base,
            multiplier,
            jitter,
            remaining: attempts,
        }
    }

    /// Get the next delay and advance the schedule, or `None` once the
    /// attempt bound is exhausted.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let delay = self.current;
        self.current = Duration::from_secs_f64(self.current.as_secs_f64() * self.multiplier);

        let jitter_amount = delay.as_secs_f64() * self.jitter * rand::random::<f64>();
        Some(delay + Duration::from_secs_f64(jitter_amount))
    }

    /// Attempts left before the schedule settles
    pub fn remaining(&self) -> u32 {
        self.remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_grows_by_multiplier() {
        let mut backoff = Backoff::new(
            Duration::from_millis(1000),
            1.5,
            0.0, // no jitter for deterministic test
            5,
        );

        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(1000)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(1500)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(2250)));
    }

    #[test]
    fn test_backoff_exhausts_after_bound() {
        let mut backoff = Backoff::new(Duration::from_millis(100), 2.0, 0.0, 2);

        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert_eq!(backoff.next_delay(), None);
        // stays exhausted
        assert_eq!(backoff.next_delay(), None);
    }

    #[test]
    fn test_backoff_from_config_uses_defaults() {
        let mut backoff = Backoff::from_config(&ReconnectConfig::default());
        assert_eq!(backoff.remaining(), 5);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(1000)));
    }
}
