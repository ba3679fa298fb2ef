//! Retry policy with exponential backoff
//!
//! Describes how often and how patiently a flaky operation is re-attempted:
//! - A fixed attempt budget
//! - A base delay that doubles after every failed attempt
//! - An upper bound on any single delay
//!
//! The policy is pure data; callers drive their own attempt loop and ask a
//! [`Backoff`] for the next delay.
//!
//! # Example
//!
//! ```rust
//! use cinefeed_core::retry::{Backoff, RetryConfig};
//! use std::time::Duration;
//!
//! let mut backoff = Backoff::new(&RetryConfig::default());
//! assert_eq!(backoff.next_delay(), Duration::from_millis(600));
//! assert_eq!(backoff.next_delay(), Duration::from_millis(1200));
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Maximum delay between retries
    pub max_delay: Duration,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(600),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Create a config with no retries
    #[must_use]
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            backoff_multiplier: 1.0,
        }
    }

    /// Builder-style method to set the attempt budget
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Builder-style method to set the base delay
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    /// Calculate the delay slept before a given attempt (0-based)
    ///
    /// Attempt 0 is the first call and never waits.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        if attempt == 0 {
            return Duration::ZERO;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        scale(self.initial_delay, self.backoff_multiplier.powi(exponent)).min(self.max_delay)
    }

    /// Sum of all backoff delays when every attempt fails
    #[must_use]
    pub fn total_backoff(&self) -> Duration {
        (1..self.max_attempts.max(1))
            .map(|attempt| self.delay_for_attempt(attempt))
            .sum()
    }

    /// Upper bound on wall-clock time for one retried operation
    #[must_use]
    pub fn worst_case_duration(&self, per_attempt_timeout: Duration) -> Duration {
        per_attempt_timeout * self.max_attempts.max(1) + self.total_backoff()
    }
}

/// Running backoff state for one retried operation
#[derive(Debug, Clone)]
pub struct Backoff {
    current: Duration,
    max: Duration,
    multiplier: f64,
}

impl Backoff {
    /// Start a new backoff sequence at the configured base delay
    #[must_use]
    pub fn new(config: &RetryConfig) -> Self {
        Self {
            current: config.initial_delay.min(config.max_delay),
            max: config.max_delay,
            multiplier: config.backoff_multiplier,
        }
    }

    /// Delay the next wait would use, without advancing
    #[must_use]
    pub fn peek(&self) -> Duration {
        self.current
    }

    /// Return the current delay and advance to the next one
    pub fn next_delay(&mut self) -> Duration {
        let delay = self.current;
        self.current = scale(self.current, self.multiplier).min(self.max);
        delay
    }
}

/// Multiply a duration at nanosecond resolution, saturating on overflow
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn scale(duration: Duration, factor: f64) -> Duration {
    let nanos = (duration.as_nanos() as f64 * factor).round();
    if !nanos.is_finite() || nanos >= u64::MAX as f64 {
        return Duration::MAX;
    }
    Duration::from_nanos(nanos.max(0.0) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_matches_catalog_policy() {
        let config = RetryConfig::default();
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.initial_delay, Duration::from_millis(600));
    }

    #[test]
    fn test_delay_calculation() {
        let config = RetryConfig {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
            backoff_multiplier: 2.0,
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(0), Duration::ZERO);
        assert_eq!(config.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(config.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(config.delay_for_attempt(3), Duration::from_millis(400));
    }

    #[test]
    fn test_delay_is_capped() {
        let config = RetryConfig {
            initial_delay: Duration::from_secs(4),
            max_delay: Duration::from_secs(5),
            ..Default::default()
        };

        assert_eq!(config.delay_for_attempt(2), Duration::from_secs(5));
        assert_eq!(config.delay_for_attempt(10), Duration::from_secs(5));
    }

    #[test]
    fn test_backoff_doubles() {
        let mut backoff = Backoff::new(&RetryConfig::default());

        assert_eq!(backoff.next_delay(), Duration::from_millis(600));
        assert_eq!(backoff.peek(), Duration::from_millis(1200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(1200));
        assert_eq!(backoff.next_delay(), Duration::from_millis(2400));
    }

    #[test]
    fn test_worst_case_duration() {
        let config = RetryConfig::default();

        // 3 x 15s + 0.6s + 1.2s
        assert_eq!(
            config.worst_case_duration(Duration::from_secs(15)),
            Duration::from_millis(46_800)
        );
    }

    #[test]
    fn test_no_retry_has_no_backoff() {
        let config = RetryConfig::no_retry();
        assert_eq!(config.max_attempts, 1);
        assert_eq!(config.total_backoff(), Duration::ZERO);
    }

    proptest! {
        #[test]
        fn prop_backoff_matches_delay_for_attempt(base_ms in 1u64..2_000, attempts in 1u32..8) {
            let config = RetryConfig::default()
                .with_initial_delay(Duration::from_millis(base_ms));
            let mut backoff = Backoff::new(&config);

            for attempt in 1..=attempts {
                prop_assert_eq!(config.delay_for_attempt(attempt), backoff.next_delay());
            }
        }
    }
}
