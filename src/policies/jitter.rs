//! # Jitter for inter-poll delays.
//!
//! Several readers started at the same moment with the same interval poll in
//! lockstep. [`JitterPolicy`] spreads them out:
//!
//! - [`JitterPolicy::None`] - exact delay
//! - [`JitterPolicy::Full`] - random in `[0, delay]`
//! - [`JitterPolicy::Equal`] - `delay/2 + random[0, delay/2]`
//! - [`JitterPolicy::Decorrelated`] - random in `[first, delay × 3]`, capped at max

use rand::Rng;
use std::time::Duration;

/// Randomization applied to each computed delay.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum JitterPolicy {
    /// No jitter: use the exact delay.
    #[default]
    None,

    /// Random delay in `[0, delay]`.
    Full,

    /// `delay/2 + random[0, delay/2]`; keeps about 75% of the delay on average.
    Equal,

    /// Random delay in `[first, delay × 3]`, capped at max.
    ///
    /// Needs the extra context passed to [`apply_decorrelated`](Self::apply_decorrelated).
    Decorrelated,
}

impl JitterPolicy {
    /// Applies jitter to the given delay.
    ///
    /// `Decorrelated` returns the input unchanged here.
    pub fn apply(&self, delay: Duration) -> Duration {
        match self {
            JitterPolicy::None | JitterPolicy::Decorrelated => delay,
            JitterPolicy::Full => full(delay),
            JitterPolicy::Equal => equal(delay),
        }
    }

    /// Applies decorrelated jitter with full context.
    ///
    /// Falls back to [`apply`](Self::apply) for other policies.
    pub fn apply_decorrelated(&self, first: Duration, delay: Duration, max: Duration) -> Duration {
        if !matches!(self, JitterPolicy::Decorrelated) {
            return self.apply(delay);
        }

        let lo = millis(first);
        let hi = millis(delay).saturating_mul(3).min(millis(max)).max(lo);

        if lo >= hi {
            return first;
        }
        Duration::from_millis(rand::rng().random_range(lo..=hi))
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

fn full(delay: Duration) -> Duration {
    let ms = millis(delay);
    if ms == 0 {
        return Duration::ZERO;
    }
    Duration::from_millis(rand::rng().random_range(0..=ms))
}

fn equal(delay: Duration) -> Duration {
    let ms = millis(delay);
    let half = ms / 2;
    if half == 0 {
        return delay;
    }
    Duration::from_millis(half + rand::rng().random_range(0..=half))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn none_is_identity() {
        let d = Duration::from_millis(123);
        assert_eq!(JitterPolicy::None.apply(d), d);
        assert_eq!(JitterPolicy::default(), JitterPolicy::None);
    }

    #[test]
    fn decorrelated_degenerate_range_returns_first() {
        let first = Duration::from_millis(100);
        let got = JitterPolicy::Decorrelated.apply_decorrelated(first, first, first);
        assert_eq!(got, first);
    }

    #[test]
    fn millis_saturate_instead_of_truncating() {
        assert_eq!(millis(Duration::MAX), u64::MAX);
        assert_eq!(millis(Duration::from_millis(1500)), 1500);

        let d = JitterPolicy::Equal.apply(Duration::MAX);
        assert!(d >= Duration::from_millis(u64::MAX / 2));
    }

    #[test]
    fn equal_on_tiny_delay_is_identity() {
        let d = Duration::from_millis(1);
        assert_eq!(JitterPolicy::Equal.apply(d), d);
    }
}
