//! Exponential backoff with jitter for throttled requests.
//!
//! Many clients hitting the same throttled partition would otherwise retry
//! in lockstep. Each delay is `2^retry_count` times a window drawn uniformly
//! from `[min_window, max_window)` milliseconds, with `retry_count` clamped
//! to a ceiling.

use std::time::Duration;

use rand::Rng;

use crate::error::ConfigError;

/// Default exponent ceiling for [`BackoffPolicy`].
pub const DEFAULT_BACKOFF_CEILING: u32 = 8;

/// Default inclusive lower bound of the jitter window, in milliseconds.
pub const DEFAULT_MIN_WINDOW_MS: u64 = 300;

/// Default exclusive upper bound of the jitter window, in milliseconds.
pub const DEFAULT_MAX_WINDOW_MS: u64 = 600;

/// Computes the wait before a retry.
///
/// # Example
///
/// ```rust
/// use documentdb::clients::BackoffPolicy;
/// use std::time::Duration;
///
/// let policy = BackoffPolicy::default();
/// let delay = policy.delay(2);
/// assert!(delay >= Duration::from_millis(4 * 300));
/// assert!(delay < Duration::from_millis(4 * 600));
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BackoffPolicy {
    ceiling: u32,
    min_window_ms: u64,
    max_window_ms: u64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            ceiling: DEFAULT_BACKOFF_CEILING,
            min_window_ms: DEFAULT_MIN_WINDOW_MS,
            max_window_ms: DEFAULT_MAX_WINDOW_MS,
        }
    }
}

impl BackoffPolicy {
    /// Creates a policy with a custom jitter window.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBackoffWindow`] unless `min_ms < max_ms`.
    pub fn new(ceiling: u32, min_ms: u64, max_ms: u64) -> Result<Self, ConfigError> {
        if min_ms >= max_ms {
            return Err(ConfigError::InvalidBackoffWindow { min_ms, max_ms });
        }
        Ok(Self {
            ceiling,
            min_window_ms: min_ms,
            max_window_ms: max_ms,
        })
    }

    /// Returns a copy of this policy with a different exponent ceiling.
    ///
    /// Ceilings above 32 are lowered to 32 so the multiplier fits in a `u64`
    /// with any reasonable window.
    #[must_use]
    pub const fn with_ceiling(mut self, ceiling: u32) -> Self {
        self.ceiling = if ceiling > 32 { 32 } else { ceiling };
        self
    }

    /// Returns the exponent ceiling.
    #[must_use]
    pub const fn ceiling(&self) -> u32 {
        self.ceiling
    }

    /// Returns the jitter window as `(inclusive_min_ms, exclusive_max_ms)`.
    #[must_use]
    pub const fn window_ms(&self) -> (u64, u64) {
        (self.min_window_ms, self.max_window_ms)
    }

    /// Returns the delay to wait before retry number `retry_count`.
    ///
    /// Counts above the ceiling produce the same distribution as the
    /// ceiling itself.
    #[must_use]
    pub fn delay(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.min(self.ceiling).min(32);
        let window = rand::thread_rng().gen_range(self.min_window_ms..self.max_window_ms);
        Duration::from_millis((1_u64 << exponent).saturating_mul(window))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(policy: &BackoffPolicy, exponent: u32) -> (Duration, Duration) {
        let (min, max) = policy.window_ms();
        (
            Duration::from_millis((1 << exponent) * min),
            Duration::from_millis((1 << exponent) * max),
        )
    }

    #[test]
    fn test_delay_within_window_up_to_ceiling() {
        let policy = BackoffPolicy::default();
        for retry in 0..=8 {
            let (low, high) = bounds(&policy, retry);
            for _ in 0..50 {
                let delay = policy.delay(retry);
                assert!(delay >= low, "retry {retry}: {delay:?} < {low:?}");
                assert!(delay < high, "retry {retry}: {delay:?} >= {high:?}");
            }
        }
    }

    #[test]
    fn test_delay_clamped_above_ceiling() {
        let policy = BackoffPolicy::default();
        let (low, high) = bounds(&policy, 8);
        for retry in [9, 13, 14, 100, u32::MAX] {
            let delay = policy.delay(retry);
            assert!(delay >= low && delay < high, "retry {retry}: {delay:?}");
        }
    }

    #[test]
    fn test_custom_ceiling() {
        let policy = BackoffPolicy::default().with_ceiling(2);
        let (low, high) = bounds(&policy, 2);
        let delay = policy.delay(10);
        assert!(delay >= low && delay < high);
    }

    #[test]
    fn test_custom_window() {
        let policy = BackoffPolicy::new(8, 1, 2).unwrap();
        assert_eq!(policy.delay(0), Duration::from_millis(1));
        assert_eq!(policy.delay(3), Duration::from_millis(8));
    }

    #[test]
    fn test_rejects_empty_window() {
        assert_eq!(
            BackoffPolicy::new(8, 600, 300),
            Err(ConfigError::InvalidBackoffWindow {
                min_ms: 600,
                max_ms: 300
            })
        );
        assert!(BackoffPolicy::new(8, 5, 5).is_err());
    }
}
