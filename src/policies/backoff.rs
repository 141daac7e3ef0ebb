//! # Pacing policy between empty polls.
//!
//! [`BackoffPolicy`] decides how long the poll driver sleeps after the `n`-th
//! consecutive empty poll. It is parameterized by:
//! - [`BackoffPolicy::first`] the delay after the first empty poll (the poll interval);
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::max`] the delay cap.
//!
//! The delay for empty poll `n` is `first × factor^n`, clamped to `max`, then
//! jitter is applied. The base never depends on earlier jittered values.
//! Whatever the parameters, the driver never sleeps less than
//! [`BackoffPolicy::MIN_DELAY`], so a poll loop cannot spin.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use pollvisor::{BackoffPolicy, JitterPolicy};
//!
//! // Fixed 100ms interval (the default pacing of an acquisition).
//! let fixed = BackoffPolicy::constant(Duration::from_millis(100));
//! assert_eq!(fixed.next(0), Duration::from_millis(100));
//! assert_eq!(fixed.next(50), Duration::from_millis(100));
//!
//! // Slow down an idle reader: 50ms, 100ms, 200ms ... capped at 1s.
//! let relaxed = BackoffPolicy {
//!     first: Duration::from_millis(50),
//!     max: Duration::from_secs(1),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//! assert_eq!(relaxed.next(2), Duration::from_millis(200));
//! assert_eq!(relaxed.next(10), Duration::from_secs(1));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Inter-poll delay policy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BackoffPolicy {
    /// Delay after the first empty poll.
    pub first: Duration,
    /// Maximum delay between polls.
    pub max: Duration,
    /// Multiplicative growth factor (`1.0` = constant interval).
    pub factor: f64,
    /// Jitter applied to each delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Constant 100ms interval without jitter.
    fn default() -> Self {
        Self::constant(Duration::from_millis(100))
    }
}

impl BackoffPolicy {
    /// Lower bound applied to every computed delay.
    pub const MIN_DELAY: Duration = Duration::from_millis(1);

    /// Fixed interval between polls.
    pub const fn constant(interval: Duration) -> Self {
        Self {
            first: interval,
            max: interval,
            factor: 1.0,
            jitter: JitterPolicy::None,
        }
    }

    /// Returns a copy with a different jitter policy.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Computes the delay after empty poll number `empty_polls` (0-indexed).
    ///
    /// The result is never below [`BackoffPolicy::MIN_DELAY`].
    pub fn next(&self, empty_polls: u32) -> Duration {
        let max_secs = self.max.as_secs_f64();
        let exp = empty_polls.min(i32::MAX as u32) as i32;
        let unclamped_secs = self.first.as_secs_f64() * self.factor.powi(exp);

        let base =
            if !unclamped_secs.is_finite() || unclamped_secs < 0.0 || unclamped_secs > max_secs {
                self.max
            } else {
                // max_secs is rounded, so the float can still exceed what a Duration holds.
                Duration::try_from_secs_f64(unclamped_secs).map_or(self.max, |d| d.min(self.max))
            };

        let jittered = match self.jitter {
            JitterPolicy::Decorrelated => {
                self.jitter
                    .apply_decorrelated(self.first.min(self.max), base, self.max)
            }
            _ => self.jitter.apply(base),
        };
        jittered.max(Self::MIN_DELAY)
    }

    /// Checks that the policy can pace a poll loop.
    pub(crate) fn validate(&self) -> Result<(), &'static str> {
        if self.first.is_zero() {
            return Err("poll interval must be greater than zero");
        }
        if self.max < self.first {
            return Err("pacing max must not be below the poll interval");
        }
        if !self.factor.is_finite() || self.factor <= 0.0 {
            return Err("pacing factor must be a positive finite number");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constant_interval_never_changes() {
        let policy = BackoffPolicy::constant(Duration::from_millis(100));
        for n in [0, 1, 5, 1000, u32::MAX] {
            assert_eq!(policy.next(n), Duration::from_millis(100), "empty poll {n}");
        }
    }

    #[test]
    fn exponential_growth_is_capped() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_millis(800),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(policy.next(0), Duration::from_millis(100));
        assert_eq!(policy.next(1), Duration::from_millis(200));
        assert_eq!(policy.next(3), Duration::from_millis(800));
        assert_eq!(policy.next(4), Duration::from_millis(800));
        assert_eq!(policy.next(u32::MAX), Duration::from_millis(800));
    }

    #[test]
    fn huge_interval_saturates_at_max() {
        let policy = BackoffPolicy::constant(Duration::MAX);
        assert!(policy.validate().is_ok());
        assert_eq!(policy.next(0), Duration::MAX);
        assert_eq!(policy.next(u32::MAX), Duration::MAX);

        let growing = BackoffPolicy {
            first: Duration::from_secs(u64::MAX / 4),
            max: Duration::MAX,
            factor: 3.0,
            jitter: JitterPolicy::None,
        };
        assert!(growing.next(0) < growing.next(1));
        assert_eq!(growing.next(2), Duration::MAX);

        for jitter in [JitterPolicy::Full, JitterPolicy::Equal, JitterPolicy::Decorrelated] {
            let d = policy.with_jitter(jitter).next(1);
            assert!(d >= BackoffPolicy::MIN_DELAY, "{jitter:?} gave {d:?}");
        }
    }

    #[test]
    fn full_jitter_keeps_minimum_delay() {
        let policy = BackoffPolicy::constant(Duration::from_millis(5)).with_jitter(JitterPolicy::Full);
        for n in 0..200 {
            let d = policy.next(n);
            assert!(d >= BackoffPolicy::MIN_DELAY, "delay {d:?} below floor");
            assert!(d <= Duration::from_millis(5));
        }
    }

    #[test]
    fn equal_jitter_bounds() {
        let policy =
            BackoffPolicy::constant(Duration::from_millis(1000)).with_jitter(JitterPolicy::Equal);
        for n in 0..50 {
            let d = policy.next(n);
            assert!(d >= Duration::from_millis(500));
            assert!(d <= Duration::from_millis(1000));
        }
    }

    #[test]
    fn decorrelated_stays_within_first_and_max() {
        let policy = BackoffPolicy {
            first: Duration::from_millis(100),
            max: Duration::from_secs(2),
            factor: 2.0,
            jitter: JitterPolicy::Decorrelated,
        };
        for _ in 0..100 {
            let d = policy.next(6);
            assert!(d >= Duration::from_millis(100));
            assert!(d <= Duration::from_secs(2));
        }
    }

    #[test]
    fn validation_rejects_unusable_pacing() {
        assert!(BackoffPolicy::constant(Duration::ZERO).validate().is_err());
        assert!(
            BackoffPolicy {
                first: Duration::from_millis(100),
                max: Duration::from_millis(10),
                factor: 1.0,
                jitter: JitterPolicy::None,
            }
            .validate()
            .is_err()
        );
        assert!(
            BackoffPolicy {
                factor: f64::NAN,
                ..BackoffPolicy::default()
            }
            .validate()
            .is_err()
        );
        assert!(BackoffPolicy::default().validate().is_ok());
    }
}
